//! Shared card, store, and offer types.
//!
//! These serialize as camelCase JSON, matching the TypeScript peers' wire
//! format.

use serde::{Deserialize, Serialize};

/// A monetary amount with its currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Money {
    /// Numerical amount
    pub amount: f64,
    /// Currency for that amount, e.g. "USD"
    pub currency: String,
}

/// Physical print variant of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishTreatment {
    Nonfoil,
    Foil,
}

/// Stock availability reported by a store.
///
/// Absent on the wire decodes as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    #[default]
    Unknown,
}

/// How closely an offer matched the requested printing.
///
/// `Exact` means the store matched set code and collector number; anything
/// weaker is `Loose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchQualification {
    Exact,
    #[default]
    Loose,
}

/// Normalized card-identity fields used to query a store.
///
/// Produced by an external descriptor source (a page scraper in the original
/// deployment); never mutated by the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLookupDescriptor {
    /// The card name as displayed, e.g. "Yuna, Hope of Spira"
    pub name: String,

    /// Print variants the caller is interested in.
    ///
    /// Empty means "whatever finishes the store offers".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finish_treatments: Vec<FinishTreatment>,

    /// Full computed title, often with set and collector number,
    /// e.g. "Yuna, Hope of Spira (Final Fantasy #404)"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scryfall_title: Option<String>,

    /// Uppercase set code, e.g. "FIN"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_code: Option<String>,

    /// Collector number within the set, e.g. "404" or "404a"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collector_number: Option<String>,

    /// Border treatment, e.g. "borderless", "black", "silver"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_treatment: Option<String>,
}

impl CardLookupDescriptor {
    /// Create a descriptor carrying only a card name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            finish_treatments: Vec::new(),
            scryfall_title: None,
            set_code: None,
            collector_number: None,
            border_treatment: None,
        }
    }
}

/// One concrete offer for a card at a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundCardInformation {
    /// Product title as the store names it
    pub title: String,
    /// Direct link to the product page
    pub url: String,
    /// Price, absent when the store does not expose one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    /// Stock state, `Unknown` when the store did not say
    #[serde(default)]
    pub availability: Availability,
    /// Print variant this offer covers
    pub finish_treatment: FinishTreatment,
    /// How closely the offer matched the requested printing
    #[serde(default, rename = "match")]
    pub match_quality: MatchQualification,
}

/// Information about one store hosted by a library peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMeta {
    /// Key unique within the library; the hub echoes it back on lookups
    pub key: String,
    /// Human-displayable store name
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_svg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_data_url: Option<String>,
}

impl StoreMeta {
    /// Create a meta with key and display name only.
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            logo_url: None,
            logo_svg: None,
            logo_data_url: None,
        }
    }
}

/// Outcome of a card lookup at one store.
///
/// `found: false` is a successful answer, not an error; the store understood
/// the request and has no matching card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLookupResult {
    /// Whether the card was found at the store
    pub found: bool,
    /// The offers, empty when not found
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cards: Vec<FoundCardInformation>,
}

impl CardLookupResult {
    /// The card was not found at the store.
    pub fn not_found() -> Self {
        Self {
            found: false,
            cards: Vec::new(),
        }
    }

    /// The card was found with the given offers.
    pub fn found(cards: Vec<FoundCardInformation>) -> Self {
        Self { found: true, cards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(title: &str) -> FoundCardInformation {
        FoundCardInformation {
            title: title.into(),
            url: format!("https://store.example/{title}"),
            price: Some(Money {
                amount: 4.99,
                currency: "USD".into(),
            }),
            availability: Availability::InStock,
            finish_treatment: FinishTreatment::Nonfoil,
            match_quality: MatchQualification::Exact,
        }
    }

    // ==================== Descriptor ====================

    #[test]
    fn test_descriptor_minimal_wire_format() {
        let descriptor = CardLookupDescriptor::new("Yuna, Hope of Spira");
        let json = serde_json::to_string(&descriptor).unwrap();

        // Optional fields are omitted entirely, matching the TS shape
        assert_eq!(json, r#"{"name":"Yuna, Hope of Spira"}"#);
    }

    #[test]
    fn test_descriptor_full_wire_format() {
        let descriptor = CardLookupDescriptor {
            name: "Yuna, Hope of Spira".into(),
            finish_treatments: vec![FinishTreatment::Nonfoil, FinishTreatment::Foil],
            scryfall_title: Some("Yuna, Hope of Spira (Final Fantasy #404)".into()),
            set_code: Some("FIN".into()),
            collector_number: Some("404".into()),
            border_treatment: Some("borderless".into()),
        };
        let json = serde_json::to_string(&descriptor).unwrap();

        assert!(json.contains(r#""finishTreatments":["nonfoil","foil"]"#));
        assert!(json.contains(r#""scryfallTitle":"#));
        assert!(json.contains(r#""setCode":"FIN""#));
        assert!(json.contains(r#""collectorNumber":"404""#));
        assert!(json.contains(r#""borderTreatment":"borderless""#));
    }

    #[test]
    fn test_descriptor_missing_finishes_decode_empty() {
        let descriptor: CardLookupDescriptor =
            serde_json::from_str(r#"{"name":"Sol Ring"}"#).unwrap();
        assert!(descriptor.finish_treatments.is_empty());
    }

    // ==================== Offers ====================

    #[test]
    fn test_offer_wire_format() {
        let json = serde_json::to_string(&offer("Sol Ring")).unwrap();

        assert!(json.contains(r#""availability":"in_stock""#));
        assert!(json.contains(r#""finishTreatment":"nonfoil""#));
        assert!(json.contains(r#""match":"exact""#));
        assert!(json.contains(r#""price":{"amount":4.99,"currency":"USD"}"#));
    }

    #[test]
    fn test_offer_defaults_when_fields_absent() {
        // Peers may omit availability and match; both default
        let json = r#"{"title":"Sol Ring","url":"https://x","finishTreatment":"foil"}"#;
        let parsed: FoundCardInformation = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.availability, Availability::Unknown);
        assert_eq!(parsed.match_quality, MatchQualification::Loose);
        assert!(parsed.price.is_none());
    }

    #[test]
    fn test_offer_roundtrip() {
        let original = offer("Sol Ring");
        let json = serde_json::to_vec(&original).unwrap();
        let parsed: FoundCardInformation = serde_json::from_slice(&json).unwrap();
        assert_eq!(original, parsed);
    }

    // ==================== Lookup result ====================

    #[test]
    fn test_not_found_wire_format() {
        let json = serde_json::to_string(&CardLookupResult::not_found()).unwrap();
        assert_eq!(json, r#"{"found":false}"#);
    }

    #[test]
    fn test_found_carries_cards() {
        let result = CardLookupResult::found(vec![offer("Sol Ring")]);
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.contains(r#""found":true"#));
        assert!(json.contains(r#""cards":["#));

        let parsed: CardLookupResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cards.len(), 1);
    }

    #[test]
    fn test_not_found_decode_without_cards_field() {
        let parsed: CardLookupResult = serde_json::from_str(r#"{"found":false}"#).unwrap();
        assert!(!parsed.found);
        assert!(parsed.cards.is_empty());
    }

    // ==================== Store meta ====================

    #[test]
    fn test_store_meta_wire_format() {
        let meta = StoreMeta::new("star-city-games", "StarCity Games");
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"key":"star-city-games","name":"StarCity Games"}"#);
    }

    #[test]
    fn test_store_meta_logo_fields_camel_case() {
        let meta = StoreMeta {
            logo_url: Some("https://x/logo.png".into()),
            ..StoreMeta::new("k", "n")
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains(r#""logoUrl":"#));
    }
}
