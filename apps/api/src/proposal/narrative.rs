//! Post-processing for model-written markdown: splice in each domain's
//! compliance block, then lift the result into content blocks.

use crate::content::ContentBlock;
use crate::knowledge::KnowledgeDomain;

/// Inserts every applicable domain's narrative block, in registry order.
///
/// A block goes immediately before the first line starting with its anchor,
/// or at the end when the anchor is absent. A block whose marker line is
/// already present is skipped, so running this on its own output is a no-op.
pub fn insert_compliance_blocks(markdown: &str, domains: &[&KnowledgeDomain]) -> String {
    let mut text = markdown.trim_end().to_string();

    for insert in domains.iter().filter_map(|d| d.narrative.as_ref()) {
        if find_line(&text, insert.marker, true).is_some() {
            continue;
        }
        let block = insert.block();
        match find_line(&text, insert.anchor, false) {
            Some(offset) => text.insert_str(offset, &format!("{block}\n\n")),
            None if text.is_empty() => text = block,
            None => {
                text.push_str("\n\n");
                text.push_str(&block);
            }
        }
    }
    text
}

/// Byte offset of the first line equal to (or, when `exact` is false,
/// starting with) `needle`, ignoring case and surrounding whitespace.
fn find_line(text: &str, needle: &str, exact: bool) -> Option<usize> {
    let needle = needle.to_uppercase();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let candidate = line.trim().to_uppercase();
        let hit = if exact {
            candidate == needle
        } else {
            candidate.starts_with(&needle)
        };
        if hit {
            return Some(offset + (line.len() - line.trim_start().len()));
        }
        offset += line.len();
    }
    None
}

/// Line-oriented markdown reader: `#` headings, `-`/`*` bullets (consecutive
/// bullets share one list), whole-line `**bold**` as emphasis, anything else a paragraph.
pub fn markdown_to_blocks(markdown: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for raw in markdown.lines() {
        let line = raw.trim();

        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            items.push(item.trim().to_string());
            continue;
        }
        if !items.is_empty() {
            blocks.push(ContentBlock::list(std::mem::take(&mut items)));
        }
        if line.is_empty() {
            continue;
        }

        let hashes = line.chars().take_while(|c| *c == '#').count();
        if hashes > 0 && line[hashes..].starts_with(' ') {
            blocks.push(ContentBlock::heading(hashes as u8, line[hashes..].trim()));
        } else if let Some(bold) = line
            .strip_prefix("**")
            .and_then(|l| l.strip_suffix("**"))
            .filter(|l| !l.is_empty())
        {
            blocks.push(ContentBlock::emphasis(bold));
        } else {
            blocks.push(ContentBlock::paragraph(line));
        }
    }

    if !items.is_empty() {
        blocks.push(ContentBlock::list(items));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{cdm2015, london, nhs};

    const DRAFT: &str = "## APPROACH\nWe plan carefully.\n\n## SUSTAINABILITY\nLow carbon.\n\n## CONCLUSION\nThank you.";

    #[test]
    fn test_blocks_go_before_their_anchors_in_registry_order() {
        let (cdm, health, london) = (cdm2015::domain(), nhs::domain(), london::domain());
        let out = insert_compliance_blocks(DRAFT, &[&cdm, &health, &london]);

        let pos = |s: &str| out.find(s).unwrap();
        assert!(pos("### London-Specific Requirements") < pos("## SUSTAINABILITY"));
        assert!(pos("## SUSTAINABILITY") < pos("## CDM 2015 REGULATORY COMPLIANCE"));
        assert!(pos("## CDM 2015 REGULATORY COMPLIANCE") < pos("## NHS-SPECIFIC COMPLIANCE"));
        assert!(pos("## NHS-SPECIFIC COMPLIANCE") < pos("## CONCLUSION"));
        assert!(out.ends_with("Thank you."));
    }

    #[test]
    fn test_insertion_is_idempotent() {
        let (cdm, health, london) = (cdm2015::domain(), nhs::domain(), london::domain());
        let domains = [&cdm, &health, &london];
        let once = insert_compliance_blocks(DRAFT, &domains);
        let twice = insert_compliance_blocks(&once, &domains);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("## CDM 2015 REGULATORY COMPLIANCE").count(), 1);
    }

    #[test]
    fn test_missing_anchor_appends() {
        let cdm = cdm2015::domain();
        let out = insert_compliance_blocks("Just prose.", &[&cdm]);
        assert!(out.starts_with("Just prose.\n\n## CDM 2015 REGULATORY COMPLIANCE"));
    }

    #[test]
    fn test_anchor_match_ignores_case() {
        let cdm = cdm2015::domain();
        let out = insert_compliance_blocks("Body\n## Conclusion\nEnd", &[&cdm]);
        assert!(out.find("## CDM 2015").unwrap() < out.find("## Conclusion").unwrap());
    }

    #[test]
    fn test_markdown_to_blocks() {
        let blocks = markdown_to_blocks("# Title\n\nIntro line\n- one\n* two\n\n**Key point**\n### Deep");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::heading(1, "Title"),
                ContentBlock::paragraph("Intro line"),
                ContentBlock::list(["one", "two"]),
                ContentBlock::emphasis("Key point"),
                ContentBlock::heading(3, "Deep"),
            ]
        );
    }

    #[test]
    fn test_hash_without_space_is_text() {
        assert_eq!(
            markdown_to_blocks("#hashtag"),
            vec![ContentBlock::paragraph("#hashtag")]
        );
    }
}
