//! Content blocks: the structural unit every proposal section is assembled from.
//!
//! Sections are built through [`SectionBuilder`], which only ever appends.
//! Once `build()` is called the section is frozen; nothing downstream reorders blocks.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Section identity
// ────────────────────────────────────────────────────────────────────────────

/// The four proposal sections, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    ExecutiveSummary,
    TechnicalResponse,
    CommercialResponse,
    SupportingInformation,
}

impl SectionId {
    pub const CANONICAL_ORDER: [SectionId; 4] = [
        SectionId::ExecutiveSummary,
        SectionId::TechnicalResponse,
        SectionId::CommercialResponse,
        SectionId::SupportingInformation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SectionId::ExecutiveSummary => "Executive Summary",
            SectionId::TechnicalResponse => "Technical Response",
            SectionId::CommercialResponse => "Commercial Response",
            SectionId::SupportingInformation => "Supporting Information",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Subheading { text: String },
    Paragraph {
        text: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        emphasis: bool,
    },
    List { items: Vec<String> },
}

impl ContentBlock {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        ContentBlock::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
        }
    }

    pub fn subheading(text: impl Into<String>) -> Self {
        ContentBlock::Subheading { text: text.into() }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph {
            text: text.into(),
            emphasis: false,
        }
    }

    pub fn emphasis(text: impl Into<String>) -> Self {
        ContentBlock::Paragraph {
            text: text.into(),
            emphasis: true,
        }
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentBlock::List {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Every piece of text carried by the block, in display order.
    pub fn texts(&self) -> Vec<&str> {
        match self {
            ContentBlock::Heading { text, .. }
            | ContentBlock::Subheading { text }
            | ContentBlock::Paragraph { text, .. } => vec![text.as_str()],
            ContentBlock::List { items } => items.iter().map(String::as_str).collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSection {
    pub id: SectionId,
    pub title: String,
    pub content: Vec<ContentBlock>,
}

impl ProposalSection {
    /// Newline-joined text of every block.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .flat_map(|b| b.texts())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Append-only builder for a single proposal section.
#[derive(Debug)]
pub struct SectionBuilder {
    id: SectionId,
    blocks: Vec<ContentBlock>,
}

impl SectionBuilder {
    pub fn new(id: SectionId) -> Self {
        Self { id, blocks: Vec::new() }
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn push(&mut self, block: ContentBlock) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn extend<I: IntoIterator<Item = ContentBlock>>(&mut self, blocks: I) -> &mut Self {
        self.blocks.extend(blocks);
        self
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) -> &mut Self {
        self.push(ContentBlock::heading(level, text))
    }

    pub fn subheading(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ContentBlock::subheading(text))
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ContentBlock::paragraph(text))
    }

    pub fn emphasis(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(ContentBlock::emphasis(text))
    }

    pub fn list<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(ContentBlock::list(items))
    }

    pub fn build(self) -> ProposalSection {
        ProposalSection {
            id: self.id,
            title: self.id.title().to_string(),
            content: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_append_order() {
        let mut builder = SectionBuilder::new(SectionId::TechnicalResponse);
        builder
            .heading(2, "Methodology")
            .paragraph("First")
            .list(["a", "b"])
            .subheading("Later");
        let section = builder.build();

        assert_eq!(section.title, "Technical Response");
        assert_eq!(section.content.len(), 4);
        assert_eq!(section.content[0], ContentBlock::heading(2, "Methodology"));
        assert_eq!(section.content[3], ContentBlock::subheading("Later"));
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(
            ContentBlock::heading(9, "x"),
            ContentBlock::Heading {
                level: 6,
                text: "x".to_string()
            }
        );
    }

    #[test]
    fn test_plain_text_flattens_lists() {
        let mut builder = SectionBuilder::new(SectionId::ExecutiveSummary);
        builder.paragraph("Intro").list(["one", "two"]);
        assert_eq!(builder.build().plain_text(), "Intro\none\ntwo");
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let json = serde_json::to_value(ContentBlock::paragraph("hi")).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert_eq!(json["text"], "hi");
        assert!(json.get("emphasis").is_none());
    }
}
