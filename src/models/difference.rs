use serde::{Deserialize, Serialize};
use std::fmt;

use super::Offer;

/// Both sides of a matched pair, as rendered in the difference sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPair {
    pub title: String,
    pub node_id: String,
    pub desc_text1: String,
    pub desc_text2: String,
    pub price1: String,
    pub price2: String,
    pub price_difference: String,
}

/// One line of the reconciliation report.
///
/// The tag values are the labels the spreadsheet writer colours rows by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "differenceType")]
pub enum DifferenceRecord {
    #[serde(rename = "✅✅✅ SAME")]
    Same(MatchedPair),
    #[serde(rename = "❌❌❌ DIFFERENT")]
    Different(MatchedPair),
    #[serde(rename = "❌❌❌ ADD ME")]
    AddMe(Offer),
    #[serde(rename = "➕➕➕ ADDITIONAL LOT")]
    AdditionalLot(Offer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifferenceKind {
    Same,
    Different,
    AddMe,
    AdditionalLot,
}

impl DifferenceRecord {
    pub fn kind(&self) -> DifferenceKind {
        match self {
            DifferenceRecord::Same(_) => DifferenceKind::Same,
            DifferenceRecord::Different(_) => DifferenceKind::Different,
            DifferenceRecord::AddMe(_) => DifferenceKind::AddMe,
            DifferenceRecord::AdditionalLot(_) => DifferenceKind::AdditionalLot,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DifferenceRecord::Same(pair) | DifferenceRecord::Different(pair) => &pair.title,
            DifferenceRecord::AddMe(offer) | DifferenceRecord::AdditionalLot(offer) => &offer.title,
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferenceKind::Same => write!(f, "✅✅✅ SAME"),
            DifferenceKind::Different => write!(f, "❌❌❌ DIFFERENT"),
            DifferenceKind::AddMe => write!(f, "❌❌❌ ADD ME"),
            DifferenceKind::AdditionalLot => write!(f, "➕➕➕ ADDITIONAL LOT"),
        }
    }
}
