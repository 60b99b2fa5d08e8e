//! Knowledge Domain Registry: the regulatory rule sets proposals are built and scored against.
//!
//! A `DomainRegistry` is plain immutable data, built once at start-up and shared
//! behind an `Arc`. Registration order matters: it is the order in which domain
//! content is appended to proposal sections and the order recommendations are
//! emitted, so it must never depend on hashing.
//!
//! Tests build their own minimal registries with [`DomainRegistry::new`].

pub mod cdm2015;
pub mod handlers;
pub mod london;
pub mod nhs;
pub mod strategies;

use serde::{Deserialize, Serialize};

use crate::analysis::models::ProjectMetadata;
use crate::content::{ContentBlock, SectionId};

// ────────────────────────────────────────────────────────────────────────────
// Identity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(String);

impl DomainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    ConstructionSafety,
    HealthcareClient,
    Regional,
}

// ────────────────────────────────────────────────────────────────────────────
// Applicability
// ────────────────────────────────────────────────────────────────────────────

/// Case-insensitive keyword lists, one per metadata field. A domain applies
/// when any keyword is a substring of its field.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicability {
    pub project_type: Vec<&'static str>,
    pub client_type: Vec<&'static str>,
    pub location: Vec<&'static str>,
}

impl Applicability {
    pub fn matches(&self, meta: &ProjectMetadata) -> bool {
        contains_any(&meta.project_type, &self.project_type)
            || contains_any(&meta.client_type, &self.client_type)
            || contains_any(&meta.location, &self.location)
    }
}

fn contains_any(field: &str, keywords: &[&str]) -> bool {
    let field = field.to_lowercase();
    keywords.iter().any(|k| field.contains(&k.to_lowercase()))
}

/// Lowercase substring search for any of `needles` inside already-lowercased `haystack`.
pub fn mentions_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles
        .iter()
        .any(|n| haystack_lower.contains(&n.to_lowercase()))
}

/// Like [`mentions_any`], but a needle must start a word: `sme` matches
/// "smes" and "local sme" but not "assessment".
pub fn mentions_any_word(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| {
        let needle = n.to_lowercase();
        haystack_lower.match_indices(&needle).any(|(idx, _)| {
            haystack_lower[..idx]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
        })
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Checklist
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementCheck {
    /// Passes when any keyword appears.
    Keywords { any_of: Vec<&'static str> },
    /// Scores `min(weight, matched/3 × weight)` over the domain's key phrases.
    KeyPhraseDensity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredElement {
    pub id: &'static str,
    pub description: &'static str,
    pub weight: u32,
    pub check: ElementCheck,
}

/// Boolean signal over raw tender text, used for pre-generation coverage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageFlag {
    pub key: &'static str,
    pub any_of: Vec<&'static str>,
    pub mandatory: bool,
    pub recommendation: Option<&'static str>,
}

// ────────────────────────────────────────────────────────────────────────────
// Content
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ContentFragment {
    pub section: SectionId,
    pub heading: &'static str,
    pub blocks: Vec<ContentBlock>,
}

/// A markdown block spliced into free-text output before `anchor`.
/// `marker` is the block's own first line; its presence means the block is already there.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeInsert {
    pub anchor: &'static str,
    pub marker: &'static str,
    pub body: &'static str,
}

impl NarrativeInsert {
    pub fn block(&self) -> String {
        format!("{}\n{}", self.marker, self.body.trim_end())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Domain
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeDomain {
    pub id: DomainId,
    pub kind: DomainKind,
    pub name: &'static str,
    /// Short label used in compliance statements, e.g. "CDM 2015".
    pub regulatory_label: &'static str,
    pub applicability: Applicability,
    pub required_elements: Vec<RequiredElement>,
    pub key_phrases: Vec<&'static str>,
    pub coverage_flags: Vec<CoverageFlag>,
    pub win_themes: Vec<&'static str>,
    #[serde(skip)]
    pub fragments: Vec<ContentFragment>,
    #[serde(skip)]
    pub narrative: Option<NarrativeInsert>,
    /// Emitted by the validator when this domain scores below 80%.
    pub strengthen_recommendation: &'static str,
}

impl KnowledgeDomain {
    pub fn applies_to(&self, meta: &ProjectMetadata) -> bool {
        self.applicability.matches(meta)
    }

    pub fn fragments_for(&self, section: SectionId) -> impl Iterator<Item = &ContentFragment> {
        self.fragments.iter().filter(move |f| f.section == section)
    }

    pub fn max_score(&self) -> u32 {
        self.required_elements.iter().map(|e| e.weight).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: Vec<KnowledgeDomain>,
}

impl DomainRegistry {
    pub fn new(domains: Vec<KnowledgeDomain>) -> Self {
        Self { domains }
    }

    /// Construction safety, healthcare client, regional, in that order.
    pub fn standard() -> Self {
        Self::new(vec![cdm2015::domain(), nhs::domain(), london::domain()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeDomain> {
        self.domains.iter()
    }

    pub fn get(&self, id: &DomainId) -> Option<&KnowledgeDomain> {
        self.domains.iter().find(|d| &d.id == id)
    }

    pub fn applicable(&self, meta: &ProjectMetadata) -> Vec<&KnowledgeDomain> {
        self.domains.iter().filter(|d| d.applies_to(meta)).collect()
    }

    /// Resolves ids back to domains in registry order; the first unknown id is returned as `Err`.
    pub fn resolve<'a>(&self, ids: &'a [DomainId]) -> Result<Vec<&KnowledgeDomain>, &'a DomainId> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(unknown);
        }
        Ok(self.domains.iter().filter(|d| ids.contains(&d.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(project_type: &str, client_type: &str, location: &str) -> ProjectMetadata {
        ProjectMetadata {
            project_type: project_type.to_string(),
            client_type: client_type.to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    fn ids(domains: &[&KnowledgeDomain]) -> Vec<String> {
        domains.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn test_word_mentions_need_a_word_start() {
        assert!(mentions_any_word("support for local smes", &["sme"]));
        assert!(mentions_any_word("sme spend", &["SME"]));
        assert!(!mentions_any_word("risk assessment method", &["sme"]));
        assert!(mentions_any_word("assessment by an sme panel", &["sme"]));
        assert!(!mentions_any_word("clear bottoms", &["toms"]));
        assert!(mentions_any("risk assessment method", &["sme"]));
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = DomainRegistry::standard();
        let all: Vec<_> = registry.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(all, vec!["cdm2015", "nhs", "london"]);
    }

    #[test]
    fn test_applicability_is_case_insensitive() {
        let registry = DomainRegistry::standard();
        let applicable = registry.applicable(&meta("New BUILD school", "NHS Trust", "Greater LONDON"));
        assert_eq!(ids(&applicable), vec!["cdm2015", "nhs", "london"]);

        let healthcare = registry.applicable(&meta("", "Community Health board", ""));
        assert_eq!(ids(&healthcare), vec!["nhs"]);
    }

    #[test]
    fn test_empty_metadata_activates_nothing() {
        let registry = DomainRegistry::standard();
        assert!(registry.applicable(&ProjectMetadata::default()).is_empty());
    }

    #[test]
    fn test_activation_is_monotonic_in_metadata() {
        let registry = DomainRegistry::standard();
        let base = meta("Construction", "", "");
        let richer = [
            meta("Construction works", "", ""),
            meta("Construction", "NHS", ""),
            meta("Construction", "", "London"),
            meta("Construction and build", "Health", "London Borough"),
        ];

        let before = ids(&registry.applicable(&base));
        for m in &richer {
            let after = ids(&registry.applicable(m));
            for id in &before {
                assert!(after.contains(id), "{id} dropped for {m:?}");
            }
        }
    }

    #[test]
    fn test_element_weights_match_checklists() {
        let registry = DomainRegistry::standard();
        for domain in registry.iter() {
            assert_eq!(domain.max_score(), 100, "{}", domain.id);
            assert!(!domain.key_phrases.is_empty());
            assert!(domain.narrative.is_some());
        }
    }

    #[test]
    fn test_resolve_keeps_registry_order_and_rejects_unknown() {
        let registry = DomainRegistry::standard();
        let requested = vec![DomainId::new("london"), DomainId::new("cdm2015")];
        let resolved = registry.resolve(&requested).unwrap();
        assert_eq!(ids(&resolved), vec!["cdm2015", "london"]);

        let bogus = vec![DomainId::new("mars")];
        assert_eq!(registry.resolve(&bogus).unwrap_err().as_str(), "mars");
    }

    #[test]
    fn test_minimal_registry_substitution() {
        let registry = DomainRegistry::new(vec![KnowledgeDomain {
            id: DomainId::new("test"),
            kind: DomainKind::Regional,
            name: "Test",
            regulatory_label: "Test Rules",
            applicability: Applicability {
                location: vec!["testville"],
                ..Default::default()
            },
            required_elements: vec![],
            key_phrases: vec![],
            coverage_flags: vec![],
            win_themes: vec![],
            fragments: vec![],
            narrative: None,
            strengthen_recommendation: "More test content",
        }]);
        assert_eq!(registry.applicable(&meta("", "", "Testville")).len(), 1);
        assert!(registry.applicable(&meta("", "", "London")).is_empty());
    }
}
