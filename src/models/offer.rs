use serde::{Deserialize, Serialize};

use super::DEFAULT_OPTIONS;

/// A single listing scraped from a seller storefront.
///
/// Every field defaults when absent so that a malformed snapshot still loads;
/// the reconciliation pass treats empty text and unparsable prices as zero values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc_text_en: Option<String>,
    #[serde(default)]
    pub price: String,
    #[serde(default, alias = "node_id")]
    pub node_id: String,
    #[serde(default, alias = "link")]
    pub offer_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl Offer {
    /// Canonical label: the description up to the first comma.
    pub fn label(&self) -> &str {
        text_before_comma(&self.desc_text)
    }

    pub fn label_en(&self) -> Option<&str> {
        self.desc_text_en.as_deref().map(text_before_comma)
    }

    /// Options as stored, otherwise derived from the description, otherwise the fallback.
    pub fn options_or_default(&self) -> String {
        self.options
            .as_deref()
            .filter(|o| !o.trim().is_empty())
            .map(str::to_string)
            .or_else(|| derive_options(&self.desc_text))
            .unwrap_or_else(|| DEFAULT_OPTIONS.to_string())
    }

    /// Offer id carried in the `id` query parameter of the listing link.
    pub fn listing_id(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.offer_link).ok()?;
        parsed
            .query_pairs()
            .find(|(k, _)| k == "id")
            .map(|(_, v)| v.into_owned())
    }
}

pub fn text_before_comma(text: &str) -> &str {
    text.split(',').next().unwrap_or_default()
}

/// Secondary descriptor segments (everything after the first comma), trimmed
/// and re-joined with ", ".
pub fn derive_options(desc_text: &str) -> Option<String> {
    let segments: Vec<&str> = desc_text
        .split(',')
        .skip(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_stops_at_first_comma() {
        let offer = Offer {
            desc_text: "100 gems, instant, by ID".to_string(),
            ..Default::default()
        };
        assert_eq!(offer.label(), "100 gems");
        assert_eq!(offer.options_or_default(), "instant, by ID");
    }

    #[test]
    fn options_fall_back_when_absent() {
        let offer = Offer {
            desc_text: "100 gems".to_string(),
            ..Default::default()
        };
        assert_eq!(offer.options_or_default(), DEFAULT_OPTIONS);

        let blank = Offer {
            desc_text: "100 gems".to_string(),
            options: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.options_or_default(), DEFAULT_OPTIONS);
    }

    #[test]
    fn deserializes_legacy_field_names() {
        let json = r#"{"title":"Brawl Stars","descText":"30 gems","price":"120 ₽","node_id":"1127","link":"https://funpay.com/lots/offer?id=42"}"#;
        let offer: Offer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.node_id, "1127");
        assert_eq!(offer.listing_id().as_deref(), Some("42"));
    }

    #[test]
    fn missing_fields_default() {
        let offer: Offer = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert!(offer.desc_text.is_empty());
        assert!(offer.price.is_empty());
        assert_eq!(offer.label(), "");
    }
}
