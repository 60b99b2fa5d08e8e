//! Proposal assembly: template sections, domain fragments and optional
//! tailored prose from the text generator.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod narrative;
pub mod prompts;

pub use generator::{generate, generate_question_response, generate_with_assistance, QuestionDraft};
pub use models::{AiAssistance, GenerationRequest, Proposal};
