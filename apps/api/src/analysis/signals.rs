//! Text signals computed over raw tender text before any proposal exists.

use std::collections::BTreeMap;

use crate::analysis::models::{Coverage, ScoredQuestion, SocialValueScore};
use crate::knowledge::{mentions_any_word, KnowledgeDomain};
use crate::parser::{Question, ScoringCriterion};

/// Five fixed social-value categories: labour, local spend, carbon, volunteering, reporting.
const SOCIAL_VALUE_CHECKS: &[(&str, &[&str])] = &[
    ("apprenticeships", &["apprentice", "trainee"]),
    (
        "localSpend",
        &["local supplier", "sme", "social enterprise", "community"],
    ),
    ("carbon", &["carbon", "co2", "net zero", "emission"]),
    ("volunteering", &["volunteer", "community hours"]),
    ("reporting", &["toms", "social value model", "reporting"]),
];

const POINTS_PER_SOCIAL_VALUE_HIT: u32 = 20;

/// Flags from every flag-style domain, keyed by flag. Needles must start a word. The score is
/// `round(100 × matched / total)`, or 0 when there are no flags at all.
pub fn domain_coverage<'a, I>(domains: I, text_lower: &str) -> Coverage
where
    I: IntoIterator<Item = &'a KnowledgeDomain>,
{
    let flags: BTreeMap<String, bool> = domains
        .into_iter()
        .flat_map(|d| d.coverage_flags.iter())
        .map(|flag| (flag.key.to_string(), mentions_any_word(text_lower, &flag.any_of)))
        .collect();

    let matched = flags.values().filter(|hit| **hit).count();
    let coverage_score = percentage(matched, flags.len());

    Coverage {
        flags,
        coverage_score,
    }
}

pub fn social_value(text_lower: &str) -> SocialValueScore {
    let checks: BTreeMap<String, bool> = SOCIAL_VALUE_CHECKS
        .iter()
        .map(|(key, needles)| (key.to_string(), mentions_any_word(text_lower, needles)))
        .collect();

    let hits = checks.values().filter(|hit| **hit).count() as u32;
    SocialValueScore {
        score: (POINTS_PER_SOCIAL_VALUE_HIT * hits).min(100),
        checks,
    }
}

/// Pairs `questions[i]` with `criteria[i]`. Either list empty ⇒ no pairs.
///
/// Index pairing mispairs when a tender lists criteria in a different order
/// or count from its questions; it is kept because tenders in practice list
/// both in the same order, and proximity matching has not been validated.
pub fn pair_positionally(
    questions: &[Question],
    criteria: &[ScoringCriterion],
) -> Vec<ScoredQuestion> {
    if questions.is_empty() || criteria.is_empty() {
        return Vec::new();
    }

    questions
        .iter()
        .enumerate()
        .map(|(idx, question)| ScoredQuestion {
            question: question.clone(),
            score_weight: criteria.get(idx).map(|c| c.weighting),
        })
        .collect()
}

pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{london, DomainRegistry};

    fn question(id: &str) -> Question {
        Question {
            id: id.to_string(),
            text: format!("{id}?"),
            word_limit: None,
        }
    }

    fn criterion(weighting: u8) -> ScoringCriterion {
        ScoringCriterion {
            criterion: format!("{weighting}% quality"),
            weighting,
        }
    }

    #[test]
    fn test_coverage_counts_london_flags() {
        let domain = london::domain();
        let coverage = domain_coverage(
            [&domain],
            "the construction logistics plan must address ulez and s106",
        );
        assert_eq!(coverage.flags.len(), 6);
        assert_eq!(coverage.flags["constructionLogisticsPlan"], true);
        assert_eq!(coverage.flags["section106"], true);
        assert_eq!(coverage.flags["nrmm"], false);
        // 3 of 6
        assert_eq!(coverage.coverage_score, 50);
    }

    #[test]
    fn test_coverage_without_flag_domains_is_zero() {
        let registry = DomainRegistry::new(vec![]);
        let coverage = domain_coverage(registry.iter(), "anything");
        assert!(coverage.flags.is_empty());
        assert_eq!(coverage.coverage_score, 0);
    }

    #[test]
    fn test_social_value_is_capped_linear() {
        assert_eq!(social_value("").score, 0);
        assert_eq!(social_value("two apprentices will join").score, 20);

        let all = social_value(
            "apprentice places, local supplier spend, net zero, volunteer days, toms reporting",
        );
        assert_eq!(all.score, 100);
        assert!(all.checks.values().all(|hit| *hit));
    }

    #[test]
    fn test_social_value_ignores_needles_inside_words() {
        let result = social_value("a full risk assessment of the bottoms of the excavation");
        assert_eq!(result.checks["localSpend"], false);
        assert_eq!(result.checks["reporting"], false);
        assert_eq!(result.score, 0);

        assert!(social_value("we will use sme subcontractors").checks["localSpend"]);
    }

    #[test]
    fn test_coverage_flags_ignore_needles_inside_words() {
        let coverage = domain_coverage([&london::domain()], "the bottoms of the xclp piles");
        assert_eq!(coverage.flags["constructionLogisticsPlan"], false);
        assert_eq!(coverage.coverage_score, 0);
    }

    #[test]
    fn test_positional_pairing() {
        let paired = pair_positionally(
            &[question("q1"), question("q5"), question("q9")],
            &[criterion(40), criterion(60)],
        );
        let weights: Vec<_> = paired.iter().map(|q| q.score_weight).collect();
        assert_eq!(weights, vec![Some(40), Some(60), None]);
    }

    #[test]
    fn test_pairing_requires_both_lists() {
        assert!(pair_positionally(&[question("q1")], &[]).is_empty());
        assert!(pair_positionally(&[], &[criterion(50)]).is_empty());
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(1, 6), 17);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(0, 0), 0);
    }
}
