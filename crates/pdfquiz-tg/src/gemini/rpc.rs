//! Subset of the `generateContent` JSON API of the Gemini models.
//! Reference: <https://ai.google.dev/api/generate-content>
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub(crate) contents: Vec<RequestContent>,
    pub(crate) generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub(crate) fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                max_output_tokens: 8192,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestContent {
    pub(crate) parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestPart {
    pub(crate) text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub(crate) temperature: f64,
    pub(crate) max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,

    /// Present when the prompt itself was blocked, in which case there
    /// are no candidates at all
    pub(crate) prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub(crate) content: Option<ResponseContent>,
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub(crate) parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponsePart {
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    pub(crate) block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub(crate) fn into_text(self) -> Result<String, super::GenerationError> {
        let block_reason = self.prompt_feedback.and_then(|feedback| feedback.block_reason);

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(super::GenerationError::NoCandidates { block_reason })?;

        candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(super::GenerationError::MissingText {
                finish_reason: candidate.finish_reason,
            })
    }
}
