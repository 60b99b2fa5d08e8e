//! Construction (Design and Management) Regulations 2015, plus the surrounding
//! UK construction law (HSWA 1974, Building Regulations 2010) that every
//! construction bid is expected to acknowledge.

use crate::content::{ContentBlock, SectionId};
use crate::knowledge::{
    Applicability, ContentFragment, DomainId, DomainKind, ElementCheck, KnowledgeDomain,
    NarrativeInsert, RequiredElement,
};

pub const ID: &str = "cdm2015";

struct DutyHolder {
    role: &'static str,
    regulations: &'static str,
    duties: &'static [(&'static str, &'static str)],
    statements: &'static [&'static str],
}

const DUTY_HOLDERS: &[DutyHolder] = &[
    DutyHolder {
        role: "Client",
        regulations: "Regulation 4-5",
        duties: &[
            ("Make suitable arrangements for managing the project", "Reg 4(1)"),
            ("Allocate sufficient time and resources to each phase", "Reg 4(1)"),
            ("Ensure the principal designer and principal contractor carry out their duties", "Reg 4(2)"),
            ("Ensure welfare facilities are provided throughout the works", "Reg 4(3)"),
            ("Provide pre-construction information to every designer and contractor", "Reg 4(4)"),
            ("Appoint a principal designer in writing", "Reg 5(1)(a)"),
            ("Appoint a principal contractor in writing", "Reg 5(1)(b)"),
        ],
        statements: &[
            "We will support the client in discharging every duty under Regulations 4 and 5.",
            "We will confirm that the construction phase plan is in place before works start on site.",
        ],
    },
    DutyHolder {
        role: "Principal Designer",
        regulations: "Regulation 11-12",
        duties: &[
            ("Plan, manage and monitor the pre-construction phase", "Reg 11(1)"),
            ("Identify, eliminate or control foreseeable risks", "Reg 11(3)"),
            ("Ensure designers comply with their duties", "Reg 11(4)"),
            ("Ensure all persons in the pre-construction phase cooperate", "Reg 11(5)"),
            ("Assist the client in providing pre-construction information", "Reg 11(6)"),
            ("Prepare and review the health and safety file", "Reg 12(5)"),
        ],
        statements: &[
            "We will coordinate with the principal designer from the first design meeting.",
            "Design risk registers will be reviewed at every design stage gateway.",
        ],
    },
    DutyHolder {
        role: "Principal Contractor",
        regulations: "Regulation 12-15",
        duties: &[
            ("Prepare the construction phase plan before the site is set up", "Reg 12(1)"),
            ("Plan, manage and monitor the construction phase", "Reg 13(1)"),
            ("Organise cooperation between contractors", "Reg 13(3)"),
            ("Ensure suitable site inductions are provided", "Reg 13(4)(b)"),
            ("Prevent unauthorised access to the site", "Reg 13(4)(c)"),
            ("Provide welfare facilities in line with Schedule 2", "Reg 13(4)(c)"),
            ("Consult and engage with workers on health and safety", "Reg 14"),
        ],
        statements: &[
            "As principal contractor we accept full responsibility for managing the construction phase.",
            "Every operative will receive a site-specific induction before starting work.",
        ],
    },
    DutyHolder {
        role: "Designers",
        regulations: "Regulation 9-10",
        duties: &[
            ("Eliminate foreseeable risks through design", "Reg 9(2)"),
            ("Reduce or control risks that cannot be eliminated", "Reg 9(3)"),
            ("Provide design information to the principal designer", "Reg 9(4)"),
            ("Cooperate with the client and other duty holders", "Reg 8(6)"),
        ],
        statements: &["Design information will be issued with residual risks clearly flagged."],
    },
    DutyHolder {
        role: "Contractors",
        regulations: "Regulation 15",
        duties: &[
            ("Plan, manage and monitor their own work", "Reg 15(2)"),
            ("Comply with directions from the principal contractor", "Reg 15(5)"),
            ("Provide workers with information, instruction and training", "Reg 15(8)"),
            ("Do not start work unless unauthorised access is prevented", "Reg 15(11)"),
        ],
        statements: &["Subcontractors are selected on demonstrated competence and CDM 2015 track record."],
    },
];

const PRE_CONSTRUCTION_INFO: &[&str] = &[
    "Existing site surveys, drawings and asbestos reports",
    "Known hazards and how they will be managed",
    "Client brief, programme and any constraints on the works",
    "Existing health and safety file where one exists",
];

const CONSTRUCTION_PHASE_PLAN: &[&str] = &[
    "Project description, key dates and duty holder contacts",
    "Site rules, induction arrangements and welfare provision",
    "Arrangements for controlling significant site risks",
    "Emergency procedures and first aid arrangements",
    "Monitoring, review and communication arrangements",
];

const HEALTH_AND_SAFETY_FILE: &[&str] = &[
    "Residual hazards and how they are managed",
    "As-built drawings and structural principles",
    "Hazardous materials used and their locations",
    "Maintenance and cleaning arrangements for the finished building",
];

const HSWA_1974: &[&str] = &[
    "Section 2: duties to employees for safe systems of work, training and supervision",
    "Section 3: duties to persons other than employees, including the public and building users",
    "Section 7: duties of employees to take reasonable care and cooperate",
    "Written health and safety policy reviewed annually",
];

const BUILDING_REGULATIONS: &[&str] = &[
    "Part A structure, Part B fire safety, Part L conservation of fuel and power",
    "Building control notifications and inspections at each statutory stage",
    "Golden thread of building information maintained for higher-risk buildings",
    "Completion certificates obtained before handover",
];

const NARRATIVE_BODY: &str = "\
The works will be delivered in full compliance with the Construction (Design and Management) Regulations 2015.

- Duty holder responsibilities are defined for the client, principal designer, principal contractor, designers and contractors.
- Pre-construction information will be reviewed and integrated into the design and programme.
- A comprehensive construction phase plan will be in place before works start.
- The health and safety file will be maintained throughout the project and handed over at completion.
- Risk management follows the hierarchy of elimination, reduction and control, with risk assessments reviewed weekly.
";

pub fn domain() -> KnowledgeDomain {
    KnowledgeDomain {
        id: DomainId::new(ID),
        kind: DomainKind::ConstructionSafety,
        name: "Construction (Design and Management) Regulations 2015",
        regulatory_label: "CDM 2015",
        applicability: Applicability {
            project_type: vec!["construction", "build"],
            ..Default::default()
        },
        required_elements: vec![
            RequiredElement {
                id: "dutyHolders",
                description: "Duty holder responsibilities",
                weight: 20,
                check: ElementCheck::Keywords {
                    any_of: vec![
                        "duty holder",
                        "principal contractor",
                        "principal designer",
                        "client",
                        "designer",
                        "contractor",
                    ],
                },
            },
            RequiredElement {
                id: "preConstructionInfo",
                description: "Pre-construction information",
                weight: 15,
                check: ElementCheck::Keywords {
                    any_of: vec!["pre-construction", "pre construction information"],
                },
            },
            RequiredElement {
                id: "constructionPhasePlan",
                description: "Construction phase plan",
                weight: 20,
                check: ElementCheck::Keywords {
                    any_of: vec!["construction phase plan", "construction phase"],
                },
            },
            RequiredElement {
                id: "healthAndSafetyFile",
                description: "Health and safety file",
                weight: 15,
                check: ElementCheck::Keywords {
                    any_of: vec!["health and safety file", "safety file"],
                },
            },
            RequiredElement {
                id: "keyPhrases",
                description: "CDM 2015 key phrases",
                weight: 10,
                check: ElementCheck::KeyPhraseDensity,
            },
            RequiredElement {
                id: "riskManagement",
                description: "Risk management approach",
                weight: 20,
                check: ElementCheck::Keywords {
                    any_of: vec!["risk management", "risk assessment", "risk mitigation"],
                },
            },
        ],
        key_phrases: vec![
            "CDM 2015 compliant",
            "Fully compliant with Construction (Design and Management) Regulations 2015",
            "Duty holder responsibilities clearly defined",
            "Pre-construction information reviewed and integrated",
            "Comprehensive construction phase plan",
            "Health and safety file maintained throughout project",
            "Worker welfare facilities provided in accordance with CDM 2015",
            "Principal contractor and principal designer coordination",
            "Risk elimination and mitigation through design",
            "Competent persons with relevant qualifications",
        ],
        coverage_flags: vec![],
        win_themes: vec!["CDM 2015 compliance expertise", "Innovative construction methods"],
        fragments: fragments(),
        narrative: Some(NarrativeInsert {
            anchor: "## CONCLUSION",
            marker: "## CDM 2015 REGULATORY COMPLIANCE",
            body: NARRATIVE_BODY,
        }),
        strengthen_recommendation: "Enhance CDM 2015 compliance content",
    }
}

fn fragments() -> Vec<ContentFragment> {
    let mut cdm = vec![ContentBlock::paragraph(
        "We are fully compliant with the Construction (Design and Management) Regulations 2015. \
         Duty holder responsibilities are set out below, with the regulation each duty derives from.",
    )];
    for holder in DUTY_HOLDERS {
        cdm.push(ContentBlock::heading(
            4,
            format!("{} Duties ({})", holder.role, holder.regulations),
        ));
        cdm.push(ContentBlock::list(
            holder
                .duties
                .iter()
                .map(|(duty, reg)| format!("{duty} ({reg})")),
        ));
        cdm.push(ContentBlock::list(holder.statements.iter().copied()));
    }
    cdm.extend([
        ContentBlock::heading(4, "Pre-Construction Information"),
        ContentBlock::list(PRE_CONSTRUCTION_INFO.iter().copied()),
        ContentBlock::heading(4, "Construction Phase Plan"),
        ContentBlock::list(CONSTRUCTION_PHASE_PLAN.iter().copied()),
        ContentBlock::heading(4, "Health and Safety File"),
        ContentBlock::list(HEALTH_AND_SAFETY_FILE.iter().copied()),
        ContentBlock::heading(4, "CDM 2015 Compliance Summary"),
        ContentBlock::emphasis(
            "Risk management, competence checks and welfare provision are audited monthly \
             against CDM 2015 by our health and safety team.",
        ),
    ]);

    vec![
        ContentFragment {
            section: SectionId::ExecutiveSummary,
            heading: "CDM 2015 Compliance",
            blocks: vec![ContentBlock::paragraph(
                "We will act as a CDM 2015 compliant principal contractor, with duty holder \
                 responsibilities clearly defined from appointment to handover.",
            )],
        },
        ContentFragment {
            section: SectionId::TechnicalResponse,
            heading: "CDM 2015 Compliance",
            blocks: cdm,
        },
        ContentFragment {
            section: SectionId::TechnicalResponse,
            heading: "Health and Safety at Work etc. Act 1974",
            blocks: vec![ContentBlock::list(HSWA_1974.iter().copied())],
        },
        ContentFragment {
            section: SectionId::TechnicalResponse,
            heading: "Building Regulations 2010",
            blocks: vec![ContentBlock::list(BUILDING_REGULATIONS.iter().copied())],
        },
        ContentFragment {
            section: SectionId::SupportingInformation,
            heading: "CDM 2015 Documentation",
            blocks: vec![ContentBlock::list([
                "F10 notification to the HSE (where the project is notifiable)",
                "Draft construction phase plan",
                "Principal contractor competence evidence",
                "Health and safety file index",
            ])],
        },
    ]
}
