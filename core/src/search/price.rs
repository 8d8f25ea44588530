//! Price tags attached to search hits

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::OnceLock;

/// What a hit costs, as far as the text tells us
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Price {
    Free,
    /// Lowest amount mentioned, in local currency
    Amount(f64),
    #[default]
    Unknown,
}

/// "free" tied to getting in: entry, admission, tickets, the event itself
fn free_entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:free\s+(?:entry|admission|entrance|event|tickets?|to\s+attend|of\s+charge)|(?:entry|admission|entrance|tickets?)\s+(?:is\s+|are\s+)?free|no\s+(?:entry\s+)?(?:fee|charge)|complimentary\s+(?:entry|admission|tickets?))\b",
        )
        .expect("free entry pattern is valid")
    })
}

/// Bare "free" or "complimentary" with the neighbouring words captured
fn free_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:\b(?P<before>[a-z]+)[\s-]+)?\b(?:free|complimentary)\b(?:[\s-]+(?P<after>[a-z-]+))?")
            .expect("free word pattern is valid")
    })
}

/// Words that make a nearby "free" describe something other than the price of going
const FREE_BEFORE: &[&str] = &[
    "gluten", "dairy", "sugar", "nut", "lactose", "alcohol", "smoke", "drug", "tax", "duty",
    "fee", "interest", "hands", "car", "stress", "hassle", "fragrance", "scent", "plastic",
];
const FREE_AFTER: &[&str] = &[
    "parking", "wifi", "wi-fi", "shuttle", "shipping", "delivery", "cloakroom",
];

/// Whether a bare "free" in the text is about the event being free
fn mentions_free_event(text: &str) -> bool {
    free_word_pattern().captures_iter(text).any(|caps| {
        let before = caps.name("before").map(|m| m.as_str().to_lowercase());
        let after = caps.name("after").map(|m| m.as_str().to_lowercase());
        !before.is_some_and(|w| FREE_BEFORE.contains(&w.as_str()))
            && !after.is_some_and(|w| FREE_AFTER.contains(&w.as_str()))
    })
}

fn amount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:(?:\ba\$|\$|\baud\s*\$?)\s?(?P<pre>\d[\d,]*(?:\.\d{1,2})?))|(?:\b(?P<post>\d[\d,]*(?:\.\d{1,2})?)\s?aud\b)",
        )
        .expect("amount pattern is valid")
    })
}

impl Price {
    /// Derive a price from free text.
    ///
    /// Free entry or admission wins. Otherwise the lowest amount mentioned is
    /// the price, and only without any amount does a bare "free" count, unless
    /// it is about parking, diet and the like.
    pub fn extract(text: &str) -> Self {
        if free_entry_pattern().is_match(text) {
            return Price::Free;
        }

        let lowest = amount_pattern()
            .captures_iter(text)
            .filter_map(|caps| caps.name("pre").or_else(|| caps.name("post")))
            .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .fold(None, |min: Option<f64>, value| {
                Some(min.map_or(value, |m| m.min(value)))
            });

        match lowest {
            Some(value) => Price::from_amount(value),
            None if mentions_free_event(text) => Price::Free,
            None => Price::Unknown,
        }
    }

    /// Interpret a label the model handed back ("free", "$25", "25", "unknown")
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "unknown" | "n/a" | "tba" | "tbc" => Price::Unknown,
            "free" => Price::Free,
            _ => match trimmed.replace(',', "").parse::<f64>() {
                Ok(value) => Price::from_amount(value),
                Err(_) => Price::extract(trimmed),
            },
        }
    }

    fn from_amount(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            Price::Unknown
        } else if value == 0.0 {
            Price::Free
        } else {
            Price::Amount(value)
        }
    }

    /// Budget predicate: known price at or under the ceiling. Free fits any
    /// non-negative ceiling, unknown prices never fit.
    pub fn fits_budget(&self, ceiling: f64) -> bool {
        match self {
            Price::Free => ceiling >= 0.0,
            Price::Amount(amount) => *amount <= ceiling,
            Price::Unknown => false,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Price::Unknown)
    }

    /// Human-readable form, e.g. "free", "$25.00", "price unknown"
    pub fn display(&self) -> String {
        match self {
            Price::Free => "free".to_string(),
            Price::Amount(amount) => format!("${:.2}", amount),
            Price::Unknown => "price unknown".to_string(),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Price::Free => serializer.serialize_str("free"),
            Price::Amount(amount) => serializer.serialize_f64(*amount),
            Price::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Amount(f64),
            Label(String),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            None => Price::Unknown,
            Some(Repr::Amount(value)) => Price::from_amount(value),
            Some(Repr::Label(label)) => Price::from_label(&label),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_free_keywords() {
        assert_eq!(Price::extract("Jazz on the lawn - FREE entry"), Price::Free);
        assert_eq!(Price::extract("No charge for members"), Price::Free);
        assert_eq!(Price::extract("Tickets $0 at the door"), Price::Free);
        assert_eq!(Price::extract("Complimentary drinks"), Price::Free);
    }

    #[test]
    fn test_extract_lowest_amount() {
        assert_eq!(
            Price::extract("Tickets from $45, VIP $120"),
            Price::Amount(45.0)
        );
        assert_eq!(Price::extract("General admission 30 AUD"), Price::Amount(30.0));
        assert_eq!(Price::extract("A$1,250.50 package"), Price::Amount(1250.5));
        assert_eq!(Price::extract("Doors open 7pm"), Price::Unknown);
    }

    #[test]
    fn test_incidental_free_does_not_hide_a_ticket_price() {
        assert_eq!(
            Price::extract("Concert tickets $40, free parking"),
            Price::Amount(40.0)
        );
        assert_eq!(
            Price::extract("Gluten free food festival, entry $25"),
            Price::Amount(25.0)
        );
        assert_eq!(Price::extract("Free entry, VIP upgrade $50"), Price::Free);
        assert_eq!(Price::extract("Admission is free, drinks from $8"), Price::Free);
    }

    #[test]
    fn test_incidental_free_alone_is_unknown() {
        assert_eq!(Price::extract("Gluten-free bakery crawl"), Price::Unknown);
        assert_eq!(Price::extract("Night market with free parking"), Price::Unknown);
        assert_eq!(Price::extract("Free jazz in the park"), Price::Free);
    }

    #[test]
    fn test_freedom_is_not_free() {
        assert_eq!(Price::extract("Freedom festival, $20"), Price::Amount(20.0));
    }

    #[test]
    fn test_budget_predicate() {
        assert!(Price::Free.fits_budget(0.0));
        assert!(Price::Free.fits_budget(50.0));
        assert!(Price::Amount(50.0).fits_budget(50.0));
        assert!(!Price::Amount(50.01).fits_budget(50.0));
        assert!(!Price::Amount(5.0).fits_budget(0.0));
        assert!(!Price::Unknown.fits_budget(1000.0));
    }

    #[test]
    fn test_serde_representation() {
        assert_eq!(serde_json::to_string(&Price::Free).unwrap(), "\"free\"");
        assert_eq!(serde_json::to_string(&Price::Amount(12.5)).unwrap(), "12.5");
        assert_eq!(serde_json::to_string(&Price::Unknown).unwrap(), "null");

        let parsed: Vec<Price> = serde_json::from_str(r#"["free", 0, 15, "$22", null, "tba"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Price::Free,
                Price::Free,
                Price::Amount(15.0),
                Price::Amount(22.0),
                Price::Unknown,
                Price::Unknown
            ]
        );
    }
}
