//! Structuring heuristics over extracted tender text.
//!
//! Everything here is line-oriented and regex-driven. No attempt is made to
//! understand the prose; a tender with no detectable structure is still valid
//! and simply yields a single "Introduction" section.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::{Question, ScoringCriterion, Section, WordLimitSummary};

pub const INTRODUCTION_TITLE: &str = "Introduction";

/// Numbered headings: `3 Scope`, `2.1 Programme`, `4. Pricing`. Any line
/// led by a dotted number and whitespace qualifies, whatever follows.
static NUMBERED_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)*\.?\s+").unwrap());

/// All-caps runs such as `EVALUATION CRITERIA` or `HEALTH & SAFETY`.
static ALL_CAPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9\s&/,()'-]*$").unwrap());

static APPENDIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^appendix\s+").unwrap());

static QUESTION_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(q(uestion)?\s*\d+\s*[:.)-]|q\s*[:.)-]|question\b)").unwrap()
});

/// A trailing `(1000 words)` turns a line into a response prompt.
static RESPONSE_PROMPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*(max(imum)?\s+)?\d{2,5}\s*words?\s*\)$").unwrap());

static WORD_LIMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{2,5})\s*words?\b").unwrap());

static SCORING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3})%\s+(quality|technical|price|commercial|social value|weighting)")
        .unwrap()
});

const MIN_CAPS_LETTERS: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

pub fn is_heading(line: &str) -> bool {
    if NUMBERED_HEADING_RE.is_match(line) || APPENDIX_RE.is_match(line) {
        return true;
    }
    ALL_CAPS_RE.is_match(line)
        && line.chars().filter(|c| c.is_ascii_uppercase()).count() >= MIN_CAPS_LETTERS
}

/// Splits text into sections. The first section is always "Introduction";
/// later sections keep their heading line verbatim as the title and are kept
/// even when empty, so titles plus contents reproduce every non-blank line.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title = INTRODUCTION_TITLE.to_string();
    let mut lines: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_heading(line) {
            sections.push(Section {
                title: std::mem::replace(&mut title, line.to_string()),
                content: lines.join(" "),
            });
            lines.clear();
        } else {
            lines.push(line);
        }
    }

    sections.push(Section {
        title,
        content: lines.join(" "),
    });
    sections
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

pub fn is_question(line: &str) -> bool {
    QUESTION_MARKER_RE.is_match(line) || line.ends_with('?') || RESPONSE_PROMPT_RE.is_match(line)
}

pub fn first_word_limit(line: &str) -> Option<u32> {
    WORD_LIMIT_RE
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Detects candidate questions. IDs derive from the zero-based line index so
/// they are stable across repeated parses of the same text.
pub fn detect_questions(text: &str) -> Vec<Question> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty() && is_question(line))
        .map(|(idx, line)| {
            let word_limit = first_word_limit(line).or_else(|| {
                lines[idx + 1..]
                    .iter()
                    .find(|l| !l.is_empty())
                    .filter(|next| !is_question(next))
                    .and_then(|next| first_word_limit(next))
            });
            Question {
                id: format!("q{idx}"),
                text: line.to_string(),
                word_limit,
            }
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Word limits & scoring weights
// ────────────────────────────────────────────────────────────────────────────

pub fn summarize_word_limits(text: &str) -> Option<WordLimitSummary> {
    let samples: Vec<u32> = WORD_LIMIT_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect();

    let max = *samples.iter().max()?;
    let min = *samples.iter().min()?;
    Some(WordLimitSummary { max, min, samples })
}

pub fn extract_scoring_criteria(text: &str) -> Vec<ScoringCriterion> {
    SCORING_RE
        .captures_iter(text)
        .filter_map(|c| {
            let weighting: u8 = c.get(1)?.as_str().parse().ok()?;
            let criterion = c.get(0)?.as_str().to_string();
            (weighting <= 100).then_some(ScoringCriterion {
                criterion,
                weighting,
            })
        })
        .collect()
}
