//! Analysis module - Euristiche sui testi di documenti e lettere CRA
//!
//! Classificazione a espressioni regolari (vince il primo pattern),
//! estrazione di scadenze e importi, valutazione dell'urgenza.

pub mod document;
pub mod extract;
pub mod letter;

pub use document::classify_document;
pub use extract::{Amount, Deadline, extract_amounts, extract_deadlines};
pub use letter::{assess_urgency, classify_letter};
