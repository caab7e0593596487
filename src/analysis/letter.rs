//! Classificazione delle lettere CRA e valutazione dell'urgenza

use super::extract::Deadline;
use crate::entities::{LetterType, Urgency};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Entro questa soglia (in giorni) una scadenza rende la lettera urgente
pub const URGENT_WITHIN_DAYS: i64 = 30;

lazy_static! {
    // l'ordine conta: "reassessment" va controllato prima di "assessment"
    static ref LETTER_PATTERNS: Vec<(LetterType, Regex)> = vec![
        (LetterType::NoticeOfReassessment, Regex::new(r"(?i)notice\s+of\s+reassessment|avis\s+de\s+nouvelle\s+cotisation").unwrap()),
        (LetterType::NoticeOfAssessment, Regex::new(r"(?i)notice\s+of\s+assessment|avis\s+de\s+cotisation").unwrap()),
        (LetterType::Audit, Regex::new(r"(?i)\baudit\b|\bauditor\b|vérification\s+fiscale").unwrap()),
        (LetterType::RequestForInformation, Regex::new(r"(?i)request\s+for\s+information|(pre|post)[-\s]assessment\s+review|processing\s+review|we\s+are\s+reviewing|please\s+(send|provide)\s+(us\s+)?(the\s+)?(following\s+)?(documents|receipts|information)").unwrap()),
        (LetterType::BalanceOwing, Regex::new(r"(?i)balance\s+(owing|due)|amount\s+(owing|due)|\bcollections?\b|legal\s+action|garnish").unwrap()),
        (LetterType::InstalmentReminder, Regex::new(r"(?i)instal?ments?\s+(reminder|payments?)").unwrap()),
        (LetterType::BenefitNotice, Regex::new(r"(?i)canada\s+child\s+benefit|\bCCB\b|GST/HST\s+credit|benefit\s+notice|climate\s+action\s+incentive|canada\s+carbon\s+rebate").unwrap()),
        (LetterType::Proposal, Regex::new(r"(?i)proposal\s+letter|we\s+propose|proposed\s+adjustments?").unwrap()),
    ];
}

/// Restituisce il tipo del primo pattern che corrisponde, `Unknown` se nessuno
pub fn classify_letter(text: &str) -> LetterType {
    LETTER_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kind, _)| *kind)
        .unwrap_or(LetterType::Unknown)
}

pub fn assess_urgency(letter_type: LetterType, deadlines: &[Deadline], today: NaiveDate) -> Urgency {
    if matches!(letter_type, LetterType::Audit | LetterType::BalanceOwing) {
        return Urgency::High;
    }

    let imminent = deadlines.iter().any(|d| {
        let short_window = d
            .within_days
            .is_some_and(|days| i64::from(days) <= URGENT_WITHIN_DAYS);
        // anche le scadenze già passate contano come urgenti
        let close_date = d
            .date
            .is_some_and(|date| (date - today).num_days() <= URGENT_WITHIN_DAYS);
        short_window || close_date
    });
    if imminent {
        return Urgency::High;
    }

    match letter_type {
        LetterType::RequestForInformation
        | LetterType::NoticeOfReassessment
        | LetterType::InstalmentReminder
        | LetterType::Proposal => Urgency::Medium,
        _ if !deadlines.is_empty() => Urgency::Medium,
        _ => Urgency::Low,
    }
}
