//! Document Parser: turns uploaded tender bytes into a `ParsedDocument`.
//!
//! Byte decoding is delegated to a [`TextExtractor`]; this module only owns the
//! structuring heuristics (sections, questions, word limits, scoring weights)
//! that run over the extracted plain text. Parsing is deterministic: the same
//! bytes and MIME type always produce the same document.

pub mod extract;
pub mod structure;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use extract::{DefaultExtractor, TextExtractor};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("could not extract text from document: {0}")]
    Extraction(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Parsed document model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    pub const DOCX_MIME: &'static str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

    /// Resolves a MIME type, ignoring parameters such as `; charset=utf-8`.
    pub fn from_mime(mime_type: &str) -> Result<Self, ParseError> {
        let essence = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Ok(DocumentFormat::Pdf),
            Self::DOCX_MIME => Ok(DocumentFormat::Docx),
            "text/plain" => Ok(DocumentFormat::Text),
            _ => Err(ParseError::UnsupportedFormat(mime_type.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    /// `None` when no limit was detected; never zero as a stand-in.
    pub word_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringCriterion {
    pub criterion: String,
    pub weighting: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordLimitSummary {
    pub max: u32,
    pub min: u32,
    pub samples: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub format: DocumentFormat,
    pub byte_len: usize,
    pub word_count: usize,
    pub word_limits: Option<WordLimitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    pub raw_text: String,
    pub sections: Vec<Section>,
    pub questions: Vec<Question>,
    pub scoring_criteria: Vec<ScoringCriterion>,
    pub metadata: DocumentMetadata,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Parses with the built-in PDF/DOCX/plain-text extractor.
pub fn parse(bytes: &[u8], mime_type: &str) -> Result<ParsedDocument, ParseError> {
    parse_with(&DefaultExtractor, bytes, mime_type)
}

pub fn parse_with(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
    mime_type: &str,
) -> Result<ParsedDocument, ParseError> {
    let format = DocumentFormat::from_mime(mime_type)?;
    let text = extractor.extract_text(bytes, format)?;
    Ok(structure_text(text, format, bytes.len()))
}

/// Runs the structuring heuristics over already-extracted text.
pub fn structure_text(text: String, format: DocumentFormat, byte_len: usize) -> ParsedDocument {
    let sections = structure::split_sections(&text);
    let questions = structure::detect_questions(&text);
    let scoring_criteria = structure::extract_scoring_criteria(&text);
    let word_limits = structure::summarize_word_limits(&text);

    ParsedDocument {
        metadata: DocumentMetadata {
            format,
            byte_len,
            word_count: text.split_whitespace().count(),
            word_limits,
        },
        raw_text: text,
        sections,
        questions,
        scoring_criteria,
    }
}
