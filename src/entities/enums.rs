//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

// ********************* ENUMERAZIONI UTILI **********************//

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Tipo di documento fiscale riconosciuto (slip, ricevute, avvisi)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    T4,
    T4a,
    T4e,
    T5,
    T3,
    T5008,
    T2202,
    RrspReceipt,
    NoticeOfAssessment,
    MedicalReceipt,
    DonationReceipt,
    ChildcareReceipt,
    RentalStatement,
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 14] = [
        DocumentType::T4,
        DocumentType::T4a,
        DocumentType::T4e,
        DocumentType::T5,
        DocumentType::T3,
        DocumentType::T5008,
        DocumentType::T2202,
        DocumentType::RrspReceipt,
        DocumentType::NoticeOfAssessment,
        DocumentType::MedicalReceipt,
        DocumentType::DonationReceipt,
        DocumentType::ChildcareReceipt,
        DocumentType::RentalStatement,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::T4 => "t4",
            DocumentType::T4a => "t4a",
            DocumentType::T4e => "t4e",
            DocumentType::T5 => "t5",
            DocumentType::T3 => "t3",
            DocumentType::T5008 => "t5008",
            DocumentType::T2202 => "t2202",
            DocumentType::RrspReceipt => "rrsp_receipt",
            DocumentType::NoticeOfAssessment => "notice_of_assessment",
            DocumentType::MedicalReceipt => "medical_receipt",
            DocumentType::DonationReceipt => "donation_receipt",
            DocumentType::ChildcareReceipt => "childcare_receipt",
            DocumentType::RentalStatement => "rental_statement",
            DocumentType::Other => "other",
        }
    }

    /// Interpreta l'etichetta restituita dal modello ("T4A", "rrsp-receipt", ...)
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }
}

/// Tipo di lettera ricevuta dalla CRA
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "letter_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LetterType {
    NoticeOfReassessment,
    NoticeOfAssessment,
    RequestForInformation,
    Audit,
    BalanceOwing,
    InstalmentReminder,
    BenefitNotice,
    Proposal,
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[sqlx(type_name = "urgency_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}
