//! Emergency message classification.
//!
//! The stand-in assigns a random label from [`LABELS`] and a confidence in
//! `[0.87, 1.0]`, drawn from a seeded [`InferenceRng`] so tests can pin the
//! output. Keywords are matched for real.

use aegis_core::{EmergencyMessage, GeoPoint, Priority, Score, Severity};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::AiError;
use crate::rng::InferenceRng;

/// Labels the message classifier can assign.
pub const LABELS: &[&str] = &[
    "structure_collapse",
    "medical_request",
    "evacuation_request",
    "fire_report",
    "flood_report",
    "missing_person",
];

/// Words that mark a message as actionable.
pub const KEYWORDS: &[&str] = &["urgent", "help", "trapped", "emergency"];

/// Label assigned to every message in a batch run.
pub const BATCH_LABEL: &str = "emergency_request";

/// Classification of a single message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLabel {
    pub priority: Priority,
    pub classification: String,
    pub confidence: Score,
    pub keywords: Vec<String>,
}

impl MessageLabel {
    /// Attach the label to its message, producing an unprocessed record.
    pub fn into_message(
        self,
        id: String,
        content: String,
        timestamp: DateTime<Utc>,
        location: Option<GeoPoint>,
    ) -> EmergencyMessage {
        EmergencyMessage {
            id,
            content,
            priority: self.priority,
            timestamp,
            location,
            classification: self.classification,
            confidence: self.confidence,
            processed: false,
        }
    }
}

/// Classification of one message within a batch, keyed by position.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLabel {
    pub message_id: String,
    pub priority: Priority,
    pub classification: String,
    pub confidence: Score,
}

/// NLP service that triages inbound messages.
pub trait MessageClassifier {
    fn classify(&mut self, text: &str) -> Result<MessageLabel, AiError>;

    /// One label per text, ids `msg_0`, `msg_1`, ... in input order.
    fn classify_batch(&mut self, texts: &[&str]) -> Result<Vec<BatchLabel>, AiError>;
}

/// Random-label stand-in with real keyword matching.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    rng: InferenceRng,
}

impl KeywordClassifier {
    pub fn new(rng: InferenceRng) -> Self {
        Self { rng }
    }
}

impl MessageClassifier for KeywordClassifier {
    fn classify(&mut self, text: &str) -> Result<MessageLabel, AiError> {
        if text.trim().is_empty() {
            return Err(AiError::EmptyInput("message text"));
        }

        let classification = self
            .rng
            .pick(LABELS)
            .copied()
            .unwrap_or(BATCH_LABEL)
            .to_string();
        let confidence = Score::new(self.rng.jitter(0.87, 0.13).min(1.0))?;
        let keywords = match_keywords(text);

        debug!(%classification, keywords = keywords.len(), "classified message");
        Ok(MessageLabel {
            priority: Severity::High,
            classification,
            confidence,
            keywords,
        })
    }

    fn classify_batch(&mut self, texts: &[&str]) -> Result<Vec<BatchLabel>, AiError> {
        let labels = texts
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let priority = *self.rng.pick(&Severity::ALL).unwrap_or(&Severity::Medium);
                Ok(BatchLabel {
                    message_id: format!("msg_{i}"),
                    priority,
                    classification: BATCH_LABEL.to_string(),
                    confidence: Score::new(self.rng.jitter(0.8, 0.2).min(1.0))?,
                })
            })
            .collect::<Result<Vec<_>, AiError>>()?;

        info!(count = labels.len(), "classified message batch");
        Ok(labels)
    }
}

/// Keywords from [`KEYWORDS`] present in `text`, case-insensitive, in list order.
pub fn match_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect()
}
