//! London regional requirements: transport, air quality, London Plan,
//! borough obligations. Also the flag-style coverage signals checked against
//! raw tender text before any proposal exists.

use crate::content::{ContentBlock, SectionId};
use crate::knowledge::{
    Applicability, ContentFragment, CoverageFlag, DomainId, DomainKind, ElementCheck,
    KnowledgeDomain, NarrativeInsert, RequiredElement,
};

pub const ID: &str = "london";

const PLANT_AND_FLEET: &str = "Confirm NRMM and ULEZ-compliant plant and fleet.";

const TRANSPORT: &[&str] = &[
    "Construction Logistics Plan aligned to TfL guidance",
    "ULEZ and congestion charge compliant fleet",
    "Just-in-time delivery booking to avoid peak hours",
    "Traffic marshals at site gates and cycle safety (FORS / CLOCS) standards",
];

const ENVIRONMENTAL: &[&str] = &[
    "Air quality monitoring in line with the London Plan and the Mayor's SPG",
    "NRMM register with Stage V engines",
    "Noise and vibration management under Section 61 consents",
    "Site waste management with 95% diversion from landfill",
];

const LONDON_PLAN: &[&str] = &[
    "Section 106 obligations and local borough commitments tracked from start on site",
    "Local labour and London Living Wage for all site operatives",
    "Community engagement and consultation through a dedicated liaison officer",
];

const NARRATIVE_BODY: &str = "\
- Transport: a Construction Logistics Plan aligned to TfL guidance, with a ULEZ compliant fleet.
- Environmental: air quality and noise monitoring under the London Plan, with NRMM compliant plant.
- Borough: Section 106 obligations and community consultation managed by a liaison officer.
";

pub fn domain() -> KnowledgeDomain {
    KnowledgeDomain {
        id: DomainId::new(ID),
        kind: DomainKind::Regional,
        name: "London Plan and Borough Requirements",
        regulatory_label: "London Plan requirements",
        applicability: Applicability {
            location: vec!["london"],
            ..Default::default()
        },
        required_elements: vec![
            RequiredElement {
                id: "transport",
                description: "Transport and logistics planning",
                weight: 25,
                check: ElementCheck::Keywords {
                    any_of: vec!["transport", "ULEZ", "logistics", "delivery"],
                },
            },
            RequiredElement {
                id: "environmental",
                description: "Environmental considerations",
                weight: 25,
                check: ElementCheck::Keywords {
                    any_of: vec!["air quality", "noise", "environmental", "sustainability"],
                },
            },
            RequiredElement {
                id: "londonPlan",
                description: "London Plan compliance",
                weight: 20,
                check: ElementCheck::Keywords {
                    any_of: vec!["London Plan", "London-specific", "borough"],
                },
            },
            RequiredElement {
                id: "community",
                description: "Community engagement",
                weight: 15,
                check: ElementCheck::Keywords {
                    any_of: vec!["community", "engagement", "local", "consultation"],
                },
            },
            RequiredElement {
                id: "keyPhrases",
                description: "London-specific key phrases",
                weight: 15,
                check: ElementCheck::KeyPhraseDensity,
            },
        ],
        key_phrases: vec![
            "London Plan compliant",
            "ULEZ and congestion charge management",
            "Air quality improvement measures",
            "Minimal disruption to London transport",
            "Community engagement and consultation",
            "Heritage and conservation expertise",
            "High-density urban construction experience",
            "Sustainable construction methods",
            "Local employment and apprenticeships",
            "London construction specialist",
            "Just-in-time delivery strategies",
            "Off-site fabrication and modular construction",
            "Party wall expertise",
            "BREEAM/LEED certified projects",
        ],
        coverage_flags: vec![
            CoverageFlag {
                key: "constructionLogisticsPlan",
                any_of: vec!["construction logistics plan", "clp"],
                mandatory: true,
                recommendation: Some("Add a Construction Logistics Plan aligned to TfL guidance."),
            },
            CoverageFlag {
                key: "section106",
                any_of: vec!["section 106", "section106", "s106"],
                mandatory: true,
                recommendation: Some(
                    "Reference Section 106 obligations and local borough commitments.",
                ),
            },
            CoverageFlag {
                key: "nrmm",
                any_of: vec![
                    "nrmm",
                    "non-road mobile machinery",
                    "non road mobile machinery",
                    "nonroad mobile machinery",
                ],
                mandatory: true,
                recommendation: Some(PLANT_AND_FLEET),
            },
            CoverageFlag {
                key: "ulez",
                any_of: vec!["ulez", "ultra low emission zone"],
                mandatory: true,
                recommendation: Some(PLANT_AND_FLEET),
            },
            CoverageFlag {
                key: "socialValue",
                any_of: vec!["social value model", "toms", "tom's", "social value"],
                mandatory: false,
                recommendation: None,
            },
            CoverageFlag {
                key: "netZero",
                any_of: vec!["net zero", "carbon neutral", "breeam", "leed"],
                mandatory: false,
                recommendation: None,
            },
        ],
        win_themes: vec![
            "London construction expertise",
            "Local knowledge and presence",
            "Minimal disruption strategies",
        ],
        fragments: fragments(),
        narrative: Some(NarrativeInsert {
            anchor: "## SUSTAINABILITY",
            marker: "### London-Specific Requirements",
            body: NARRATIVE_BODY,
        }),
        strengthen_recommendation: "Add more London-specific considerations",
    }
}

fn fragments() -> Vec<ContentFragment> {
    vec![
        ContentFragment {
            section: SectionId::ExecutiveSummary,
            heading: "Delivering in London",
            blocks: vec![ContentBlock::paragraph(
                "Our London construction specialist teams plan every site around minimal \
                 disruption to London transport and neighbouring communities.",
            )],
        },
        ContentFragment {
            section: SectionId::TechnicalResponse,
            heading: "London-Specific Considerations",
            blocks: vec![
                ContentBlock::heading(4, "Transport and Logistics"),
                ContentBlock::list(TRANSPORT.iter().copied()),
                ContentBlock::heading(4, "Environmental Management"),
                ContentBlock::list(ENVIRONMENTAL.iter().copied()),
                ContentBlock::heading(4, "London Plan and Borough Obligations"),
                ContentBlock::list(LONDON_PLAN.iter().copied()),
            ],
        },
    ]
}
