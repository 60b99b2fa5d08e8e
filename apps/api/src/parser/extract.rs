//! Binary decoding: PDF, DOCX and plain text to a single string.
//!
//! `TextExtractor` is the seam: the parser never touches `pdf_extract` or
//! `docx_rs` directly, so tests and alternative decoders can be swapped in.

use std::panic::{catch_unwind, AssertUnwindSafe};

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

use crate::parser::{DocumentFormat, ParseError};

pub trait TextExtractor: Send + Sync {
    /// Must distinguish an unsupported format from corrupt content.
    fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, ParseError>;
}

/// PDF via `pdf-extract`, DOCX via `docx-rs`, plain text as UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExtractor;

impl TextExtractor for DefaultExtractor {
    fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, ParseError> {
        let text = match format {
            DocumentFormat::Pdf => extract_pdf(bytes)?,
            DocumentFormat::Docx => extract_docx(bytes)?,
            DocumentFormat::Text => String::from_utf8(bytes.to_vec())
                .map_err(|e| ParseError::Extraction(format!("text is not valid UTF-8: {e}")))?,
        };
        debug!("Extracted {} chars from {:?} document", text.len(), format);
        Ok(text)
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ParseError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ParseError::Extraction(format!("PDF decode failed: {e}"))),
        Err(_) => Err(ParseError::Extraction(
            "PDF decoder aborted on malformed content".to_string(),
        )),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ParseError> {
    let docx = docx_rs::read_docx(bytes)
        .map_err(|e| ParseError::Extraction(format!("DOCX decode failed: {e:?}")))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Paragraph → Run → Text; runs are fragments of one line so they join with no separator.
fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(t) = run_child {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}
