//! Pipeline: Parser → Analyzer → Generator → Validator, strictly in that order.
//!
//! Each stage takes the previous stage's artifact by reference and returns a
//! new one; nothing produced earlier is ever modified. The only suspension
//! point is the optional text generator inside the generation stage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analysis::{self, ProjectMetadata, TenderAnalysis};
use crate::compliance::{self, ComplianceReport};
use crate::errors::ValidationInputError;
use crate::knowledge::DomainRegistry;
use crate::llm_client::TextGenerator;
use crate::parser::{self, DefaultExtractor, ParseError, ParsedDocument, TextExtractor};
use crate::proposal::models::CompanyProfile;
use crate::proposal::{self, GenerationRequest, Proposal, QuestionDraft};

/// Document lifecycle. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Uploaded,
    Parsed,
    Analyzed,
    Generated,
    Validated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Input(#[from] ValidationInputError),
}

/// Every artifact produced so far. On failure `error` is set and `stage` is
/// the last stage that completed.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub stage: PipelineStage,
    pub document: Option<ParsedDocument>,
    pub analysis: Option<TenderAnalysis>,
    pub proposal: Option<Proposal>,
    pub report: Option<ComplianceReport>,
    pub error: Option<PipelineError>,
}

impl PipelineRun {
    fn uploaded() -> Self {
        Self {
            stage: PipelineStage::Uploaded,
            document: None,
            analysis: None,
            proposal: None,
            report: None,
            error: None,
        }
    }

    fn failed(mut self, error: impl Into<PipelineError>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.stage == PipelineStage::Validated
    }
}

pub struct Pipeline {
    registry: Arc<DomainRegistry>,
    extractor: Arc<dyn TextExtractor>,
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Pipeline {
    /// Built-in extractor, template mode only.
    pub fn new(registry: Arc<DomainRegistry>) -> Self {
        Self {
            registry,
            extractor: Arc::new(DefaultExtractor),
            generator: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn generator(&self) -> Option<&dyn TextGenerator> {
        self.generator.as_deref()
    }

    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn parse(&self, bytes: &[u8], mime_type: &str) -> Result<ParsedDocument, ParseError> {
        let document = parser::parse_with(self.extractor.as_ref(), bytes, mime_type)?;
        info!(
            "Document parsed: {} sections, {} questions, {} scoring criteria",
            document.sections.len(),
            document.questions.len(),
            document.scoring_criteria.len()
        );
        Ok(document)
    }

    pub fn analyze(&self, document: &ParsedDocument, metadata: &ProjectMetadata) -> TenderAnalysis {
        analysis::analyze(document, metadata, &self.registry)
    }

    pub async fn generate(
        &self,
        analysis: &TenderAnalysis,
        request: &GenerationRequest,
    ) -> Result<Proposal, ValidationInputError> {
        proposal::generate_with_assistance(analysis, request, &self.registry, self.generator()).await
    }

    pub async fn draft_section(
        &self,
        analysis: &TenderAnalysis,
        question_id: &str,
        company: &CompanyProfile,
        cancel: &CancellationToken,
    ) -> Result<QuestionDraft, ValidationInputError> {
        proposal::generate_question_response(
            analysis,
            question_id,
            company,
            &self.registry,
            self.generator(),
            cancel,
        )
        .await
    }

    pub fn validate(
        &self,
        proposal: &Proposal,
        analysis: &TenderAnalysis,
    ) -> Result<ComplianceReport, ValidationInputError> {
        compliance::validate(proposal, analysis, &self.registry)
    }

    /// Runs every stage, stopping at the first failure.
    pub async fn run(
        &self,
        bytes: &[u8],
        mime_type: &str,
        metadata: &ProjectMetadata,
        request: &GenerationRequest,
    ) -> PipelineRun {
        let mut run = PipelineRun::uploaded();

        let document = match self.parse(bytes, mime_type) {
            Ok(document) => document,
            Err(e) => return run.failed(e),
        };
        run.stage = PipelineStage::Parsed;

        let analysis = self.analyze(&document, metadata);
        run.document = Some(document);
        run.stage = PipelineStage::Analyzed;

        let proposal = match self.generate(&analysis, request).await {
            Ok(proposal) => proposal,
            Err(e) => {
                run.analysis = Some(analysis);
                return run.failed(e);
            }
        };
        run.stage = PipelineStage::Generated;

        let report = self.validate(&proposal, &analysis);
        run.analysis = Some(analysis);
        run.proposal = Some(proposal);
        match report {
            Ok(report) => {
                run.report = Some(report);
                run.stage = PipelineStage::Validated;
                run
            }
            Err(e) => run.failed(e),
        }
    }
}
