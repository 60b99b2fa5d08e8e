//! NHS and healthcare clients: infection control, Health Technical Memoranda,
//! working in occupied clinical buildings.

use crate::content::{ContentBlock, SectionId};
use crate::knowledge::{
    Applicability, ContentFragment, DomainId, DomainKind, ElementCheck, KnowledgeDomain,
    NarrativeInsert, RequiredElement,
};

pub const ID: &str = "nhs";

const INFECTION_PREVENTION: &[&str] = &[
    "Infection Control Risk Assessment (ICRA) agreed with the Trust infection prevention team",
    "Dust and contamination control with sealed barriers and negative pressure where required",
    "Compliance with HTM 00-01 and HBN 00-09 infection control in the built environment",
    "Daily cleaning regime and monitoring of containment integrity",
];

const OCCUPIED_BUILDINGS: &[&str] = &[
    "Phasing agreed with clinical leads to keep services running",
    "Noise and vibration limits during clinical hours",
    "Segregated contractor routes away from patient areas",
    "Permit-to-work for all work affecting live medical gas, electrical and ventilation systems",
];

const PATIENT_STAFF_SAFETY: &[&str] = &[
    "Enhanced DBS checks for operatives working in clinical areas",
    "Fire strategy maintained throughout with temporary measures agreed with the Trust",
    "Emergency power systems protected during any shutdown",
];

const HTM_REFERENCES: &[&str] = &[
    "HTM 01-05: Decontamination in primary care dental practices",
    "HTM 04-01: Safe water in healthcare premises",
    "HTM 06-02: Electrical safety guidance for low voltage systems",
    "HTM 07-02: EnCO2de, making energy work in healthcare",
];

const NARRATIVE_BODY: &str = "\
Healthcare works will be planned around patient safety and continuity of clinical services.

- Infection control: an Infection Control Risk Assessment (ICRA) will be agreed before work starts.
- HTM compliance: HTM 01-05, HTM 04-01, HTM 06-02 and HTM 07-02 will be applied where relevant.
- Clinical environment: all operatives working in clinical areas will hold enhanced DBS checks.
- Social value: local employment and apprenticeship commitments will be reported quarterly to the Trust.
";

pub fn domain() -> KnowledgeDomain {
    KnowledgeDomain {
        id: DomainId::new(ID),
        kind: DomainKind::HealthcareClient,
        name: "NHS Procurement Standards",
        regulatory_label: "NHS Procurement Standards",
        applicability: Applicability {
            client_type: vec!["nhs", "health"],
            ..Default::default()
        },
        required_elements: vec![
            RequiredElement {
                id: "infectionControl",
                description: "Infection control procedures",
                weight: 25,
                check: ElementCheck::Keywords {
                    any_of: vec!["infection", "infection control", "HTM 00", "clinical"],
                },
            },
            RequiredElement {
                id: "clinicalEnvironment",
                description: "Clinical environment experience",
                weight: 25,
                check: ElementCheck::Keywords {
                    any_of: vec!["clinical", "patient", "occupied building", "healthcare"],
                },
            },
            RequiredElement {
                id: "htmCompliance",
                description: "HTM compliance",
                weight: 20,
                check: ElementCheck::Keywords {
                    any_of: vec!["HTM", "Health Technical Memorandum"],
                },
            },
            RequiredElement {
                id: "socialValue",
                description: "Social value commitments",
                weight: 15,
                check: ElementCheck::Keywords {
                    any_of: vec!["social value", "apprenticeship", "local employment"],
                },
            },
            RequiredElement {
                id: "keyPhrases",
                description: "NHS-specific key phrases",
                weight: 15,
                check: ElementCheck::KeyPhraseDensity,
            },
        ],
        key_phrases: vec![
            "Compliant with Health Technical Memoranda (HTMs)",
            "Infection prevention and control expertise",
            "Clinical environment experience",
            "Patient safety during construction works",
            "Minimal disruption to clinical services",
            "NHS values and priorities",
            "Social value commitments",
            "Local employment and apprenticeships",
            "Healthcare construction specialist",
            "Occupied building expertise",
            "Medical gas systems",
            "Healthcare electrical systems",
            "Emergency power systems",
            "Whole-life value for money",
        ],
        coverage_flags: vec![],
        win_themes: vec![
            "Healthcare construction specialist",
            "Patient and staff safety focus",
            "Strong social value commitments",
        ],
        fragments: fragments(),
        narrative: Some(NarrativeInsert {
            anchor: "## CONCLUSION",
            marker: "## NHS-SPECIFIC COMPLIANCE",
            body: NARRATIVE_BODY,
        }),
        strengthen_recommendation: "Strengthen NHS-specific content and HTM compliance",
    }
}

fn fragments() -> Vec<ContentFragment> {
    vec![
        ContentFragment {
            section: SectionId::ExecutiveSummary,
            heading: "Healthcare Delivery",
            blocks: vec![ContentBlock::paragraph(
                "As a healthcare construction specialist we understand that patient safety \
                 and continuity of clinical services come first.",
            )],
        },
        ContentFragment {
            section: SectionId::TechnicalResponse,
            heading: "NHS Clinical Environment Management",
            blocks: vec![
                ContentBlock::heading(4, "Infection Prevention and Control"),
                ContentBlock::list(INFECTION_PREVENTION.iter().copied()),
                ContentBlock::heading(4, "Working in Occupied Buildings"),
                ContentBlock::list(OCCUPIED_BUILDINGS.iter().copied()),
                ContentBlock::heading(4, "Patient and Staff Safety"),
                ContentBlock::list(PATIENT_STAFF_SAFETY.iter().copied()),
                ContentBlock::heading(4, "Health Technical Memoranda"),
                ContentBlock::list(HTM_REFERENCES.iter().copied()),
            ],
        },
        ContentFragment {
            section: SectionId::SupportingInformation,
            heading: "Healthcare Documentation",
            blocks: vec![ContentBlock::list([
                "Infection Control Risk Assessment template",
                "Healthcare project case studies",
                "Enhanced DBS check policy",
                "Social value delivery plan",
            ])],
        },
    ]
}
