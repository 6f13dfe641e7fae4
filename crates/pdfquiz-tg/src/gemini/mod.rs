//! Client for the Gemini generative language API that asks the model to
//! write multiple choice questions about the given text.
mod rpc;

use crate::prelude::*;
use crate::{http, Result};
use serde::Deserialize;
use std::time::Duration;

/// The input text is cut to this many characters before sending it to the model
pub(crate) const MAX_INPUT_CHARS: usize = 20_000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Clone, Deserialize)]
pub(crate) struct Config {
    api_key: String,

    #[serde(default = "default_model")]
    model: String,

    #[serde(default = "default_base_url")]
    base_url: url::Url,

    /// Natural language the questions are written in
    #[serde(default = "default_language")]
    language: String,
}

fn default_model() -> String {
    "gemini-1.5-flash-latest".to_owned()
}

fn default_base_url() -> url::Url {
    url::Url::parse("https://generativelanguage.googleapis.com")
        .unwrap_or_else(|err| panic!("BUG: invalid default Gemini URL: {err:#?}"))
}

fn default_language() -> String {
    "English".to_owned()
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum GenerationError {
    #[error("Model returned no candidates (block reason: {block_reason:?})")]
    NoCandidates { block_reason: Option<String> },

    #[error("Model candidate has no text part (finish reason: {finish_reason:?})")]
    MissingText { finish_reason: Option<String> },
}

pub(crate) struct Client {
    http: http::Client,
    cfg: Config,
}

impl Client {
    pub(crate) fn new(cfg: Config) -> Self {
        Self {
            http: http::create_client(REQUEST_TIMEOUT),
            cfg,
        }
    }

    /// Same as [`Self::try_generate_mcqs`], but never fails. Any error is
    /// logged and results in an empty string.
    pub(crate) async fn generate_mcqs(&self, text: &str, count: u32) -> String {
        self.try_generate_mcqs(text, count)
            .await
            .unwrap_or_else(|err| {
                error!(err = tracing_err(&err), "Gemini API error");
                String::new()
            })
    }

    /// Returns the raw (trimmed) response of the model with `count` question
    /// blocks separated by `---`, if the model followed the instructions.
    #[instrument(skip_all, fields(model = %self.cfg.model, count = count, text_len = text.len()))]
    pub(crate) async fn try_generate_mcqs(&self, text: &str, count: u32) -> Result<String> {
        let prompt = mcq_prompt(truncate_chars(text, MAX_INPUT_CHARS), count, &self.cfg.language);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url.as_str().trim_end_matches('/'),
            self.cfg.model,
        );

        let response: rpc::GenerateContentResponse = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.cfg.api_key)
            .send_and_read_json(&rpc::GenerateContentRequest::from_prompt(prompt))
            .with_duration_log("Generated MCQs")
            .await?;

        Ok(response.into_text()?.trim().to_owned())
    }
}

fn mcq_prompt(text: &str, count: u32, language: &str) -> String {
    format!(
        "Generate exactly {count} MCQs in {language} from the text below. \
        STRICT FORMAT: Question: [text]\nA) [text]\nB) [text]\nC) [text]\nD) [text]\n\
        Correct Answer: [A,B,C, or D]\n---\nText: \"\"\"{text}\"\"\""
    )
}

/// Returns the longest prefix of `text` with at most `max` chars
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
