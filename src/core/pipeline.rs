use std::collections::HashMap;

use tracing::{
    info,
    warn,
};

use crate::{
    anki::Note,
    enrichment::EnrichmentResult,
};

pub const TEXT_FIELD: &str = "Text";
pub const CONTEXT_FIELD: &str = "Context";
pub const ENRICHMENT_FIELDS: [&str; 4] = ["MeaningStats", "Synonyms", "GrammarNote", "ExampleSen"];

/// Read/write surface of the flashcard store, implemented by `AnkiClient`.
pub trait NoteStore {
    fn find_notes(&self, deck_name: &str) -> Vec<u64>;
    fn notes_info(&self, note_ids: &[u64]) -> Vec<Note>;
    fn update_note_fields(&self, note_id: u64, fields: &HashMap<String, String>) -> bool;
}

/// One-shot analysis of a term, implemented by `EnrichmentClient`.
pub trait Enricher {
    fn analyze(&self, text: &str, context: &str) -> Option<EnrichmentResult>;
}

/// Counters for one invocation. Notes skipped for missing input are outside
/// the dataset and land in no bucket, matching the established run reports.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunTally {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteState {
    /// Term or context is empty; there is nothing to analyze.
    MissingInput,
    /// All four enrichment fields already hold content.
    Complete,
    /// At least one enrichment field is empty and input is present.
    Pending,
}

/// First matching rule wins: missing input, then already-complete, then
/// pending. Re-running over unchanged data reproduces the same skip set, so
/// an interrupted batch is resumed by simply running again.
pub fn classify(note: &Note) -> NoteState {
    if note.field(TEXT_FIELD).is_empty() || note.field(CONTEXT_FIELD).is_empty() {
        return NoteState::MissingInput;
    }

    if ENRICHMENT_FIELDS.iter().all(|name| !note.field(name).is_empty()) {
        return NoteState::Complete;
    }

    NoteState::Pending
}

/// Sequential batch over one deck: list ids, fetch details, then decide and
/// process each note in turn. Per-note failures only bump the fail counter;
/// the loop always runs to the end.
pub fn run_batch(store: &impl NoteStore, enricher: &impl Enricher, deck_name: &str) -> RunTally {
    let mut tally = RunTally::default();

    let note_ids = store.find_notes(deck_name);
    if note_ids.is_empty() {
        println!("No notes found in deck \"{deck_name}\".");
        info!(deck = deck_name, "no notes found");
        return tally;
    }

    let notes = store.notes_info(&note_ids);
    if notes.is_empty() {
        println!("Could not fetch note details from Anki.");
        warn!(deck = deck_name, "fetching note details failed");
        return tally;
    }

    tally.total = notes.len();
    println!("Loaded {} notes from \"{}\".", tally.total, deck_name);

    for (index, note) in notes.iter().enumerate() {
        let progress = format!("[{}/{}]", index + 1, tally.total);
        let text = note.field(TEXT_FIELD);

        match classify(note) {
            NoteState::MissingInput => {
                warn!(note_id = note.note_id, term = text, "skipping note with empty term or context");
                println!("{progress} skipped (missing term or context): id={}", note.note_id);
                continue;
            }
            NoteState::Complete => {
                info!(note_id = note.note_id, term = text, "skipping already enriched note");
                println!("{progress} skipped (already enriched): {text}");
                tally.skipped += 1;
                continue;
            }
            NoteState::Pending => {}
        }

        println!("{progress} analyzing \"{text}\"...");

        let Some(result) = enricher.analyze(text, note.field(CONTEXT_FIELD)) else {
            println!("{progress} analysis failed: {text}");
            tally.failed += 1;
            continue;
        };

        if store.update_note_fields(note.note_id, &result.to_fields()) {
            info!(note_id = note.note_id, term = text, "note updated");
            println!("{progress} updated: {text}");
            tally.success += 1;
        } else {
            println!("{progress} write failed: {text}");
            tally.failed += 1;
        }
    }

    tally
}
