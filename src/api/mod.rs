//! Request and response payloads exchanged with the tutor backends.

use serde::{Deserialize, Serialize};

use crate::core::classification::ClassificationResult;
use crate::core::subject::Subject;

#[derive(Serialize)]
pub struct QuestionRequest<'a> {
    pub question: &'a str,
}

#[derive(Serialize)]
pub struct AnimateRequest<'a> {
    pub manim_prompt: &'a str,
}

#[derive(Serialize)]
pub struct SubjectRequest {
    pub subject: Subject,
}

#[derive(Deserialize, Debug)]
pub struct RouterDecision {
    #[serde(default)]
    pub explanation_needed: bool,
    #[serde(default)]
    pub visualization_needed: bool,
    #[serde(default)]
    pub manim_prompt: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct RouterResponse {
    #[serde(default)]
    pub question: Option<String>,
    pub response: RouterDecision,
}

#[derive(Deserialize, Debug)]
pub struct ExplanationResponse {
    pub llm_response: String,
}

/// Informational reply from the session endpoints.
#[derive(Deserialize, Debug, Default)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

impl From<RouterDecision> for ClassificationResult {
    fn from(decision: RouterDecision) -> Self {
        ClassificationResult {
            explanation_needed: decision.explanation_needed,
            visualization_needed: decision.visualization_needed,
            animation_spec: decision.manim_prompt,
        }
    }
}
