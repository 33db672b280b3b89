use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    error,
    info,
};

use crate::{
    config::Config,
    core::{
        http::http_client,
        AnkifillError,
    },
};

/// Instruction block for the model, kept byte-for-byte from the prompt that
/// the deck's card templates were tuned against. The inline <b>/<i>/<br>
/// conventions it mandates are what the renderer expects in each field.
const SYSTEM_PROMPT: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/analysis_system.md"));

pub const MEANING_STATS: &str = "MeaningStats";
pub const SYNONYMS: &str = "Synonyms";
pub const GRAMMAR_NOTE: &str = "GrammarNote";
pub const EXAMPLE_SEN: &str = "ExampleSen";

/// The four generated study fields for one term. The model must return all
/// four keys; anything less is treated as a failed analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnrichmentResult {
    #[serde(rename = "MeaningStats")]
    pub meaning_stats: String,
    #[serde(rename = "Synonyms")]
    pub synonyms: String,
    #[serde(rename = "GrammarNote")]
    pub grammar_note: String,
    #[serde(rename = "ExampleSen")]
    pub example_sen: String,
}

impl EnrichmentResult {
    pub fn parse(content: &str) -> Result<Self, AnkifillError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Fresh field mapping per call, keyed by the Anki field names.
    pub fn to_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        fields.insert(MEANING_STATS.to_string(), self.meaning_stats.clone());
        fields.insert(SYNONYMS.to_string(), self.synonyms.clone());
        fields.insert(GRAMMAR_NOTE.to_string(), self.grammar_note.clone());
        fields.insert(EXAMPLE_SEN.to_string(), self.example_sen.clone());
        fields
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the chat-completion API (DeepSeek speaks the OpenAI wire
/// format). One request per note, no retries; a bad reply just fails that
/// note and the batch moves on.
pub struct EnrichmentClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl EnrichmentClient {
    pub fn new(config: &Config) -> Result<Self, AnkifillError> {
        Ok(EnrichmentClient {
            client: http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Analyze one term in its sentence context. Any failure (transport,
    /// auth, quota, non-JSON reply, missing keys) logs and yields `None`.
    pub fn analyze(&self, text: &str, context: &str) -> Option<EnrichmentResult> {
        info!(term = text, "requesting AI analysis");

        let content = match self.chat(text, context) {
            Ok(content) => content,
            Err(err) => {
                error!(term = text, %err, "AI request failed");
                return None;
            }
        };

        match EnrichmentResult::parse(&content) {
            Ok(result) => Some(result),
            Err(err) => {
                error!(term = text, %err, raw = %content, "AI reply was not a valid enrichment object");
                None
            }
        }
    }

    fn chat(&self, text: &str, context: &str) -> Result<String, AnkifillError> {
        let user_prompt = format!("单词/短语: {text}\n上下文例句: {context}");

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_prompt },
            ],
            temperature: 0.1,
            response_format: ResponseFormat { format: "json_object" },
        };

        let completion: ChatCompletion = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?
            .error_for_status()?
            .json()?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AnkifillError::Custom("chat completion contained no choices".to_string()))
    }
}

impl crate::core::pipeline::Enricher for EnrichmentClient {
    fn analyze(&self, text: &str, context: &str) -> Option<EnrichmentResult> {
        EnrichmentClient::analyze(self, text, context)
    }
}
