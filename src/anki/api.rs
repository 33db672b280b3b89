use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::{
    de::DeserializeOwned,
    Deserialize,
    Serialize,
};
use serde_json::Value;
use tracing::{
    debug,
    error,
    warn,
};

use crate::core::{
    http::http_client,
    AnkifillError,
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Field {
    pub value: String,
    #[serde(default)]
    order: u32,
}

impl Field {
    pub fn new(value: impl Into<String>) -> Self {
        Field { value: value.into(), order: 0 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: HashMap<String, Field>,
    #[serde(default)]
    pub model_name: String,
}

impl Note {
    /// Trimmed field value, or empty string when the field is absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(|f| f.value.trim()).unwrap_or("")
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Option<T> {
        if let Some(error) = &self.error {
            warn!(error = %error, "AnkiConnect reported an error");
        }
        self.result
    }

    /// Write acceptance: AnkiConnect answers HTTP 200 even for logical
    /// failures, so only the envelope's error field decides.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Thin client over the AnkiConnect HTTP endpoint. Every operation is
/// fail-soft: transport and bridge errors are logged and collapse to an empty
/// result or `false`, so the batch loop never has to unwind mid-run.
pub struct AnkiClient {
    client: Client,
    url: String,
}

impl AnkiClient {
    pub fn new(url: &str) -> Result<Self, AnkifillError> {
        Ok(AnkiClient { client: http_client()?, url: url.to_string() })
    }

    fn request<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Option<Value>,
    ) -> Result<ApiResponse<T>, AnkifillError> {
        let mut body = serde_json::Map::new();
        body.insert("action".to_string(), Value::String(action.to_string()));
        body.insert("version".to_string(), Value::Number(6.into()));

        if let Some(params) = params {
            body.insert("params".to_string(), params);
        }

        debug!(action, payload = %serde_json::Value::Object(body.clone()), "sending AnkiConnect request");

        let response: ApiResponse<T> =
            self.client.post(self.url.as_str()).json(&body).send()?.json()?;

        Ok(response)
    }

    /// Note ids for every note in the deck. Empty when the deck has no notes,
    /// but also when Anki is closed or the response is malformed; the log
    /// carries the distinction.
    pub fn find_notes(&self, deck_name: &str) -> Vec<u64> {
        let params = serde_json::json!({ "query": deck_query(deck_name) });

        match self.request::<Vec<u64>>("findNotes", Some(params)) {
            Ok(response) => response.into_result().unwrap_or_default(),
            Err(err) => {
                error!(%err, "findNotes failed: is Anki running with AnkiConnect enabled?");
                Vec::new()
            }
        }
    }

    /// Full field contents for the given notes. An empty id slice short
    /// circuits without a network call, since AnkiConnect rejects the request.
    pub fn notes_info(&self, note_ids: &[u64]) -> Vec<Note> {
        if note_ids.is_empty() {
            warn!("notesInfo called with no ids, skipping request");
            return Vec::new();
        }

        let params = serde_json::json!({ "notes": note_ids });
        let notes = match self.request::<Vec<Note>>("notesInfo", Some(params)) {
            Ok(response) => response.into_result().unwrap_or_default(),
            Err(err) => {
                error!(%err, "notesInfo failed");
                Vec::new()
            }
        };

        if notes.is_empty() {
            warn!("notesInfo returned nothing for {} ids; notes may have been deleted", note_ids.len());
        } else if let Some(first) = notes.first() {
            debug!(note_id = first.note_id, model = %first.model_name, "first fetched note");
        }

        notes
    }

    /// Overwrites the named fields on one note. Success means the bridge
    /// envelope carried no error string; AnkiConnect answers HTTP 200 even for
    /// logical failures, so the status line is never consulted.
    pub fn update_note_fields(&self, note_id: u64, fields: &HashMap<String, String>) -> bool {
        let params = serde_json::json!({
            "note": {
                "id": note_id,
                "fields": fields,
            }
        });

        match self.request::<Value>("updateNoteFields", Some(params)) {
            Ok(response) => {
                if let Some(error) = &response.error {
                    error!(note_id, error = %error, "updateNoteFields rejected by AnkiConnect");
                }
                response.is_success()
            }
            Err(err) => {
                error!(note_id, %err, "updateNoteFields failed");
                false
            }
        }
    }
}

impl crate::core::pipeline::NoteStore for AnkiClient {
    fn find_notes(&self, deck_name: &str) -> Vec<u64> {
        AnkiClient::find_notes(self, deck_name)
    }

    fn notes_info(&self, note_ids: &[u64]) -> Vec<Note> {
        AnkiClient::notes_info(self, note_ids)
    }

    fn update_note_fields(&self, note_id: u64, fields: &HashMap<String, String>) -> bool {
        AnkiClient::update_note_fields(self, note_id, fields)
    }
}

fn deck_query(deck_name: &str) -> String {
    format!("deck:\"{}\"", deck_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_query_quotes_the_name() {
        assert_eq!(deck_query("IELTS Vocab"), "deck:\"IELTS Vocab\"");
    }

    #[test]
    fn field_access_trims_and_defaults() {
        let mut fields = HashMap::new();
        fields.insert("Text".to_string(), Field::new("  stave off  "));
        let note = Note { note_id: 1, tags: Vec::new(), fields, model_name: String::new() };

        assert_eq!(note.field("Text"), "stave off");
        assert_eq!(note.field("Context"), "");
    }

    #[test]
    fn note_deserializes_from_notes_info_shape() {
        let raw = r#"{
            "noteId": 1502298033753,
            "modelName": "Vocab Card",
            "tags": ["ielts"],
            "fields": {
                "Text": {"value": "stave off", "order": 0},
                "Context": {"value": "exercise to stave off ageing", "order": 1}
            },
            "mod": 1718377864,
            "cards": [1498938915662]
        }"#;

        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.note_id, 1502298033753);
        assert_eq!(note.field("Text"), "stave off");
        assert_eq!(note.model_name, "Vocab Card");
    }

    #[test]
    fn write_success_is_decided_by_the_error_field_alone() {
        let ok: ApiResponse<Value> = serde_json::from_str(r#"{"result": null, "error": null}"#).unwrap();
        assert!(ok.is_success());

        let failed: ApiResponse<Value> =
            serde_json::from_str(r#"{"result": null, "error": "cannot update note"}"#).unwrap();
        assert_eq!(failed.error.as_deref(), Some("cannot update note"));
        assert!(!failed.is_success());
    }

    #[test]
    fn empty_id_list_returns_without_a_network_call() {
        // The url is unroutable; an attempted request would error loudly.
        let client = AnkiClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.notes_info(&[]).is_empty());
    }

    #[test]
    fn unreachable_bridge_yields_empty_note_ids() {
        // Connection refused must collapse to an empty list, not an error.
        let client = AnkiClient::new("http://127.0.0.1:1").unwrap();
        assert!(client.find_notes("IELTS Vocab").is_empty());
    }
}
