//! Offer reconciliation between two seller catalogs.
//!
//! List A is the reference (own) catalog and list B the comparison catalog.
//! Offers pair only when their normalized description and category are equal,
//! so identical labels in two different games never match each other.

pub mod new_offers;

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::models::{DifferenceKind, DifferenceRecord, MatchedPair, Offer};
use crate::parsers::{format_price_difference, normalize};

pub use new_offers::new_offers;

const KEY_SEPARATOR: char = '\u{1f}';

/// Matching identity: normalized description joined with the category id.
pub fn match_key(offer: &Offer) -> String {
    format!("{}{}{}", normalize(&offer.desc_text), KEY_SEPARATOR, offer.node_id)
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub records: Vec<DifferenceRecord>,
}

impl Reconciliation {
    /// The ADD_ME subset, in report order. This becomes the backlog.
    pub fn offers_to_add(&self) -> Vec<Offer> {
        self.records
            .iter()
            .filter_map(|record| match record {
                DifferenceRecord::AddMe(offer) => Some(offer.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, kind: DifferenceKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }
}

/// Classify every offer of both lists.
///
/// Records derived from `list_a` come first in A order (later A duplicates of an
/// already processed key are dropped), followed by ADDITIONAL LOT records for
/// B offers whose key never appeared in A, in B order.
pub fn reconcile(list_a: &[Offer], list_b: &[Offer]) -> Reconciliation {
    let keys_b: Vec<String> = list_b.iter().map(match_key).collect();
    let mut processed: HashSet<String> = HashSet::new();
    let mut records = Vec::with_capacity(list_a.len() + list_b.len());

    for offer_a in list_a {
        warn_if_malformed(offer_a, "A");
        let key_a = match_key(offer_a);

        if processed.contains(&key_a) {
            debug!("Skipping duplicate offer in A: {}", offer_a.desc_text);
            continue;
        }

        let matching = keys_b
            .iter()
            .position(|key_b| *key_b == key_a)
            .map(|idx| &list_b[idx]);

        let record = match matching {
            Some(offer_b) => {
                let pair = MatchedPair {
                    title: offer_a.title.clone(),
                    node_id: offer_a.node_id.clone(),
                    desc_text1: offer_a.label().to_string(),
                    desc_text2: offer_b.label().to_string(),
                    price1: offer_a.price.clone(),
                    price2: offer_b.price.clone(),
                    price_difference: format_price_difference(&offer_a.price, &offer_b.price),
                };

                // Equal keys imply equal normalized descriptions, so DIFFERENT is
                // never produced here. The branch stays for report consumers.
                if normalize(&offer_a.desc_text) == normalize(&offer_b.desc_text) {
                    DifferenceRecord::Same(pair)
                } else {
                    DifferenceRecord::Different(pair)
                }
            }
            None => DifferenceRecord::AddMe(add_me_offer(offer_a)),
        };

        records.push(record);
        processed.insert(key_a);
    }

    for (offer_b, key_b) in list_b.iter().zip(&keys_b) {
        if !processed.contains(key_b) {
            warn_if_malformed(offer_b, "B");
            records.push(DifferenceRecord::AdditionalLot(truncated(offer_b)));
        }
    }

    Reconciliation { records }
}

fn add_me_offer(offer: &Offer) -> Offer {
    Offer {
        options: Some(offer.options_or_default()),
        ..truncated(offer)
    }
}

fn truncated(offer: &Offer) -> Offer {
    Offer {
        desc_text: offer.label().to_string(),
        desc_text_en: offer.label_en().map(str::to_string),
        ..offer.clone()
    }
}

fn warn_if_malformed(offer: &Offer, side: &str) {
    if offer.desc_text.trim().is_empty() {
        warn!("Offer in list {} has no description (link: {})", side, offer.offer_link);
    }
    if offer.price.trim().is_empty() {
        warn!("Offer in list {} has no price: {}", side, offer.desc_text);
    }
}
