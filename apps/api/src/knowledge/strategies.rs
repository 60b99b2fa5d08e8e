//! Win-strategy library. Unlike the regulatory domains this is not gated on
//! project metadata: every proposal draws its baseline themes and review
//! checklist from here.

/// Themes every bid leads with, before any domain-specific ones.
pub const BASELINE_WIN_THEMES: &[&str] = &[
    "Proven track record and experience",
    "Quality and safety excellence",
    "Value for money",
];

/// Documents listed under Supporting Information for every proposal.
pub const SUPPORTING_DOCUMENTS: &[&str] = &[
    "Company Information",
    "Relevant Experience and Case Studies",
    "Key Personnel",
    "Organizational Structure",
    "Certifications and Accreditations",
    "Quality and H&S Policies",
    "Insurance Certificates",
    "References",
];

/// Review checklist attached to every generated proposal.
pub const REVIEW_RECOMMENDATIONS: &[&str] = &[
    "Review and customize all placeholder content",
    "Add specific project examples and case studies",
    "Include relevant certifications and accreditations",
    "Ensure all word limits are respected",
    "Have proposal reviewed by technical and commercial teams",
    "Verify all compliance requirements are addressed",
];

/// Heuristics offered to the text generator as tone guidance.
pub const WRITING_PRINCIPLES: &[&str] = &[
    "Answer the question asked, using the evaluator's own terminology",
    "Lead with benefits to the client, then evidence them",
    "Quantify outcomes from comparable projects",
    "Mirror the scoring criteria in headings so evaluators can find each answer",
];

/// Merges baseline themes with domain themes, keeping first occurrence order.
pub fn win_themes<'a, I>(domain_themes: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut themes: Vec<String> = Vec::new();
    for theme in BASELINE_WIN_THEMES.iter().copied().chain(domain_themes) {
        if !themes.iter().any(|t| t == theme) {
            themes.push(theme.to_string());
        }
    }
    themes
}
