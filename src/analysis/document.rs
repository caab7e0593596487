//! Classificazione dei documenti fiscali tramite espressioni regolari

use crate::entities::DocumentType;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // l'ordine conta: vince il primo pattern che trova corrispondenza
    static ref DOCUMENT_PATTERNS: Vec<(DocumentType, Regex)> = vec![
        (DocumentType::NoticeOfAssessment, Regex::new(r"(?i)notice\s+of\s+(re)?assessment|avis\s+de\s+(nouvelle\s+)?cotisation").unwrap()),
        (DocumentType::T4a, Regex::new(r"(?i)\bT4A\b|pension,\s+retirement,\s+annuity").unwrap()),
        (DocumentType::T4e, Regex::new(r"(?i)\bT4E\b|employment\s+insurance\s+(and\s+other\s+)?benefits").unwrap()),
        (DocumentType::T5008, Regex::new(r"(?i)\bT5008\b|securities\s+transactions").unwrap()),
        (DocumentType::T2202, Regex::new(r"(?i)\bT2202A?\b|tuition\s+and\s+enrolment").unwrap()),
        (DocumentType::T4, Regex::new(r"(?i)\bT4\b|statement\s+of\s+remuneration\s+paid").unwrap()),
        (DocumentType::T5, Regex::new(r"(?i)\bT5\b|statement\s+of\s+investment\s+income").unwrap()),
        (DocumentType::T3, Regex::new(r"(?i)\bT3\b|statement\s+of\s+trust\s+income").unwrap()),
        (DocumentType::RrspReceipt, Regex::new(r"(?i)\bRRSP\s+(contribution\s+)?receipt|\bRRSP\s+contribution|\bREER\b").unwrap()),
        (DocumentType::MedicalReceipt, Regex::new(r"(?i)medical\s+(expense|receipt)|pharmacy|prescription|dental|physiotherap").unwrap()),
        (DocumentType::DonationReceipt, Regex::new(r"(?i)donation|charitable|official\s+receipt\s+for\s+income\s+tax").unwrap()),
        (DocumentType::ChildcareReceipt, Regex::new(r"(?i)child\s*care|daycare|garderie").unwrap()),
        (DocumentType::RentalStatement, Regex::new(r"(?i)rental\s+(income|statement)|\brent\s+(received|roll)|\bT776\b").unwrap()),
    ];
}

/// Restituisce il tipo del primo pattern che corrisponde, `Other` se nessuno
pub fn classify_document(text: &str) -> DocumentType {
    DOCUMENT_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kind, _)| *kind)
        .unwrap_or(DocumentType::Other)
}
