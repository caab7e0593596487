//! Estrazione di scadenze e importi dal testo delle lettere

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    /// Testo così come compare nella lettera
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub within_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub raw: String,
    pub value: f64,
}

const MONTHS: &str = r"(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)\.?";

lazy_static! {
    static ref NAMED_DATE_DEADLINE: Regex = Regex::new(&format!(
        r"(?i)\b(?:on\s+or\s+before|no\s+later\s+than|by|before|due(?:\s+date)?(?:\s+is|\s+on|:)?|deadline(?:\s+is|:)?)\s+({}\s+\d{{1,2}},?\s+\d{{4}})",
        MONTHS
    ))
    .unwrap();
    static ref ISO_DATE_DEADLINE: Regex = Regex::new(
        r"(?i)\b(?:on\s+or\s+before|no\s+later\s+than|by|before|due(?:\s+date)?(?:\s+is|\s+on)?|deadline(?:\s+is)?)\s*:?\s*(\d{4}-\d{2}-\d{2})\b"
    )
    .unwrap();
    static ref WITHIN_DAYS: Regex = Regex::new(r"(?i)\bwithin\s+(\d{1,3})\s+days\b").unwrap();
    static ref DOLLAR_AMOUNT: Regex =
        Regex::new(r"\$\s?(\d{1,3}(?:,\d{3})+(?:\.\d{2})?|\d+(?:\.\d{2})?)").unwrap();
}

/// Scadenze nell'ordine in cui compaiono nel testo, senza duplicati
pub fn extract_deadlines(text: &str) -> Vec<Deadline> {
    let mut found: Vec<(usize, Deadline)> = Vec::new();

    for caps in NAMED_DATE_DEADLINE.captures_iter(text) {
        let (Some(whole), Some(date)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        found.push((
            whole.start(),
            Deadline {
                raw: whole.as_str().trim().to_string(),
                date: parse_named_date(date.as_str()),
                within_days: None,
            },
        ));
    }

    for caps in ISO_DATE_DEADLINE.captures_iter(text) {
        let (Some(whole), Some(date)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        found.push((
            whole.start(),
            Deadline {
                raw: whole.as_str().trim().to_string(),
                date: NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d").ok(),
                within_days: None,
            },
        ));
    }

    for caps in WITHIN_DAYS.captures_iter(text) {
        let (Some(whole), Some(days)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        found.push((
            whole.start(),
            Deadline {
                raw: whole.as_str().to_string(),
                date: None,
                within_days: days.as_str().parse().ok(),
            },
        ));
    }

    found.sort_by_key(|(pos, _)| *pos);
    let mut seen = HashSet::new();
    found
        .into_iter()
        .map(|(_, d)| d)
        .filter(|d| seen.insert(d.raw.to_lowercase()))
        .collect()
}

/// "March 15, 2024" / "Mar. 15 2024" -> NaiveDate
fn parse_named_date(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.replace([',', '.'], "");
    // chrono conosce solo l'abbreviazione a tre lettere
    let cleaned = cleaned
        .split_whitespace()
        .map(|token| if token.eq_ignore_ascii_case("sept") { "Sep" } else { token })
        .collect::<Vec<_>>()
        .join(" ");
    NaiveDate::parse_from_str(&cleaned, "%B %d %Y").ok()
}

/// Importi in dollari nell'ordine in cui compaiono, senza duplicati
pub fn extract_amounts(text: &str) -> Vec<Amount> {
    let mut seen = HashSet::new();
    DOLLAR_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = caps.get(0)?.as_str().to_string();
            let value = caps.get(1)?.as_str().replace(',', "").parse::<f64>().ok()?;
            seen.insert(raw.clone()).then_some(Amount { raw, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_dates_are_parsed() {
        let deadlines = extract_deadlines("Please send the receipts by March 15, 2024 to avoid a reassessment.");
        assert_eq!(deadlines.len(), 1);
        assert_eq!(deadlines[0].raw, "by March 15, 2024");
        assert_eq!(deadlines[0].date, NaiveDate::from_ymd_opt(2024, 3, 15));
    }

    #[test]
    fn abbreviated_and_iso_dates() {
        let text = "Pay on or before Sept. 30, 2024. Payment due date: 2024-10-15.";
        let deadlines = extract_deadlines(text);
        assert_eq!(deadlines.len(), 2);
        assert_eq!(deadlines[0].date, NaiveDate::from_ymd_opt(2024, 9, 30));
        assert_eq!(deadlines[1].date, NaiveDate::from_ymd_opt(2024, 10, 15));
    }

    #[test]
    fn relative_deadlines_and_order() {
        let text = "Respond within 30 days. If you cannot, call us before April 2, 2024. Again: within 30 days.";
        let deadlines = extract_deadlines(text);
        assert_eq!(deadlines.len(), 2);
        assert_eq!(deadlines[0].within_days, Some(30));
        assert_eq!(deadlines[1].raw, "before April 2, 2024");
    }

    #[test]
    fn no_deadlines_in_plain_text() {
        assert!(extract_deadlines("Thank you for filing your return.").is_empty());
    }

    #[test]
    fn amounts_are_parsed_and_deduplicated() {
        let amounts = extract_amounts("Balance owing: $1,250.75. Interest $12.40. Total $1,250.75. Refund $300");
        let values: Vec<f64> = amounts.iter().map(|a| a.value).collect();
        assert_eq!(values, vec![1250.75, 12.40, 300.0]);
    }
}
