// Shared prompt fragments. Each stage that delegates prose keeps its own
// prompts.rs next to it; only cross-cutting instructions live here.

/// Output contract for every prose-generating call: markdown, no wrapping.
pub const MARKDOWN_ONLY_INSTRUCTION: &str = "\
    Respond with GitHub-flavoured markdown only. \
    Use ## for section headings and - for bullet points. \
    Do NOT wrap the answer in code fences. \
    Do NOT include explanations, apologies or notes to the reader.";

/// Stops the model inventing company facts the profile does not contain.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Only state facts about the bidder that appear in the company profile provided. \
    Where a fact is missing, write a bracketed placeholder such as [CASE STUDY TO BE ADDED] \
    instead of inventing one.";

/// Renders `items` as a markdown bullet list, or `fallback` when empty.
pub fn bullet_list<S: AsRef<str>>(items: &[S], fallback: &str) -> String {
    if items.is_empty() {
        return fallback.to_string();
    }
    items
        .iter()
        .map(|i| format!("- {}", i.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_list_renders_items() {
        assert_eq!(bullet_list(&["a", "b"], "none"), "- a\n- b");
    }

    #[test]
    fn test_bullet_list_fallback() {
        let empty: [&str; 0] = [];
        assert_eq!(bullet_list(&empty, "(none)"), "(none)");
    }
}
