//! Sanitizzazione dell'input testuale prima di qualsiasi chiamata esterna

use crate::clients::{ChatMessage, ChatRole};
use crate::dtos::HistoryTurn;
use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_QUESTION_CHARS: usize = 3;
pub const MAX_QUESTION_CHARS: usize = 2000;
pub const MAX_HISTORY_TURNS: usize = 10;
pub const MAX_HISTORY_TURN_CHARS: usize = 4000;

lazy_static! {
    static ref SPACES: Regex = Regex::new(r"[ \t]{2,}").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("question is empty")]
    Empty,
    #[error("question must be at least 3 characters")]
    TooShort,
    #[error("question must be at most 2000 characters")]
    TooLong,
    #[error("question contains no readable text")]
    NoText,
}

/// Pulisce il testo: rimuove i caratteri di controllo (tranne a capo e tab),
/// normalizza CRLF e comprime spazi e righe vuote ripetute
pub fn clean_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    let stripped: String = normalized
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    let collapsed = SPACES.replace_all(&stripped, " ");
    BLANK_LINES.replace_all(&collapsed, "\n\n").trim().to_string()
}

pub fn sanitize_question(raw: &str) -> Result<String, SanitizeError> {
    let cleaned = clean_text(raw);
    let chars = cleaned.chars().count();

    if chars == 0 {
        return Err(SanitizeError::Empty);
    }
    if chars < MIN_QUESTION_CHARS {
        return Err(SanitizeError::TooShort);
    }
    if chars > MAX_QUESTION_CHARS {
        return Err(SanitizeError::TooLong);
    }
    if !cleaned.chars().any(char::is_alphanumeric) {
        return Err(SanitizeError::NoText);
    }
    Ok(cleaned)
}

/// Tiene gli ultimi turni utente/assistente non vuoti, troncati a lunghezza massima
pub fn sanitize_history(history: &[HistoryTurn]) -> Vec<ChatMessage> {
    let turns: Vec<ChatMessage> = history
        .iter()
        .filter(|t| matches!(t.role, ChatRole::User | ChatRole::Assistant))
        .filter_map(|t| {
            let text: String = clean_text(&t.content)
                .chars()
                .take(MAX_HISTORY_TURN_CHARS)
                .collect();
            if text.is_empty() {
                return None;
            }
            Some(match t.role {
                ChatRole::Assistant => ChatMessage::assistant(text),
                _ => ChatMessage::user(text),
            })
        })
        .collect();

    let skip = turns.len().saturating_sub(MAX_HISTORY_TURNS);
    turns.into_iter().skip(skip).collect()
}
