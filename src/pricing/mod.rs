//! Per-category price adjustment applied before republishing an offer.
//!
//! Source prices already carry the marketplace markup of their category; the
//! divisor backs that markup out so the republished price lands at the same
//! display price.

use crate::parsers::parse_price;
use crate::templates::registry;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceRule {
    /// Divide by the category markup and round to whole units.
    Divide(f64),
    /// Keep the parsed price as is, fractions included.
    Passthrough,
}

impl PriceRule {
    pub fn apply(&self, raw_price: &str) -> f64 {
        let price = parse_price(raw_price);
        match self {
            PriceRule::Divide(divisor) => (price / divisor).round(),
            PriceRule::Passthrough => price,
        }
    }
}

/// Rule registered for a category; unknown categories pass through.
pub fn price_rule(node_id: &str) -> PriceRule {
    registry::strategy(node_id)
        .map(|s| s.price_rule)
        .unwrap_or(PriceRule::Passthrough)
}

/// Republish price for `raw_price` listed under `node_id`.
///
/// Known markup categories return a rounded value; passthrough categories
/// (and any unknown category) return the parsed price unrounded.
pub fn calculate_price(node_id: &str, raw_price: &str) -> f64 {
    price_rule(node_id).apply(raw_price)
}

/// Price as sent in the form body: integral values without a fraction.
pub fn format_form_price(price: f64) -> String {
    format!("{}", price)
}
