//! Chooses between a stored answer and a generated one.

use std::sync::Arc;

use crate::completion::Completer;
use crate::storage::{RecordStore, StoreResult};

/// Answer given when the completion service fails
pub const FALLBACK_ANSWER: &str = "I'm sorry, I couldn't process your request.";

/// Answers inbound questions from the record store, falling back to a completer
pub struct Responder {
    store: Arc<dyn RecordStore>,
    completer: Arc<dyn Completer>,
}

impl Responder {
    pub fn new(store: Arc<dyn RecordStore>, completer: Arc<dyn Completer>) -> Self {
        Self { store, completer }
    }

    /// Answer `raw_text`.
    ///
    /// The text is lower-cased and used as a substring query against stored
    /// questions; the first match wins. With no match the completer is called
    /// once. Completion failures are logged and replaced by
    /// [`FALLBACK_ANSWER`]; only store failures reach the caller.
    pub async fn respond(&self, raw_text: &str) -> StoreResult<String> {
        let question = raw_text.to_lowercase();

        if let Some(record) = self.store.search(&question)?.into_iter().next() {
            tracing::debug!(record_id = record.id, "Answered from stored record");
            return Ok(record.answer);
        }

        match self.completer.complete(&question).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) => {
                tracing::error!("Error generating answer for {:?}: {}", question, e);
                Ok(FALLBACK_ANSWER.to_string())
            }
        }
    }
}
