use std::collections::HashSet;

use crate::models::Offer;

/// Offers in `current` whose link was not present in `previous`.
///
/// An empty `previous` snapshot is a first run and reports nothing.
pub fn new_offers(previous: &[Offer], current: &[Offer]) -> Vec<Offer> {
    if previous.is_empty() {
        return Vec::new();
    }

    let known: HashSet<&str> = previous.iter().map(|o| o.offer_link.as_str()).collect();
    current
        .iter()
        .filter(|o| !known.contains(o.offer_link.as_str()))
        .cloned()
        .collect()
}
