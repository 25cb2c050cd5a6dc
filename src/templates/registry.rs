//! Closed set of categories the republisher knows how to fill.
//!
//! Each entry lists, in submission order, how every category-specific form
//! field is produced, and the price rule applied to the source price. Adding a
//! category means adding an entry here and harvesting its form template.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::models::Offer;
use crate::parsers::format_description;
use crate::pricing::{format_form_price, PriceRule};

use super::{resolve_option_field, FormConfig, FormTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Ru,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    /// Literal value sent verbatim.
    Fixed(&'static str),
    /// Option-set key picked by matching the offer's options against labels.
    Choice,
    /// Offer description rendered through `format_description`.
    Summary(Locale),
    /// Static seller description from the runtime config.
    Description(Locale),
    /// Offer description as scraped.
    Quantity,
    /// Price after the category's price rule.
    Price,
}

#[derive(Debug)]
pub struct CategoryStrategy {
    pub node_id: &'static str,
    pub name: &'static str,
    pub fields: &'static [(&'static str, FieldRule)],
    pub price_rule: PriceRule,
}

impl CategoryStrategy {
    pub fn price_divisor(&self) -> Option<f64> {
        match self.price_rule {
            PriceRule::Divide(divisor) => Some(divisor),
            PriceRule::Passthrough => None,
        }
    }

    /// Category-specific fields for `offer`, in submission order.
    pub fn resolve_fields(
        &self,
        offer: &Offer,
        template: &FormTemplate,
        config: &FormConfig,
    ) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(name, rule)| {
                let value = match rule {
                    FieldRule::Fixed(value) => value.to_string(),
                    FieldRule::Choice => resolve_option_field(template, name, offer),
                    FieldRule::Summary(Locale::Ru) => format_description(&offer.desc_text),
                    FieldRule::Summary(Locale::En) => {
                        format_description(offer.desc_text_en.as_deref().unwrap_or_default())
                    }
                    FieldRule::Description(Locale::Ru) => config.desc_ru.clone(),
                    FieldRule::Description(Locale::En) => config.desc_en.clone(),
                    FieldRule::Quantity => offer.desc_text.clone(),
                    FieldRule::Price => format_form_price(self.price_rule.apply(&offer.price)),
                };
                (name.to_string(), value)
            })
            .collect()
    }

    /// Text the category listing should show once the offer is live.
    pub fn listing_text(&self, offer: &Offer) -> String {
        let has_summary = self
            .fields
            .iter()
            .any(|(_, rule)| *rule == FieldRule::Summary(Locale::Ru));
        if has_summary {
            format_description(&offer.desc_text)
        } else {
            offer.desc_text.trim().to_string()
        }
    }
}

use FieldRule::{Choice, Description, Fixed, Price, Quantity, Summary};
use Locale::{En, Ru};

const BLANK: FieldRule = Fixed(" ");
const EMPTY: FieldRule = Fixed("");
const STOCK: FieldRule = Fixed("999");

static CATEGORIES: &[CategoryStrategy] = &[
    CategoryStrategy {
        node_id: "965",
        name: "Boom Beach",
        fields: &[
            ("fields[quantity]", Quantity),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[payment_msg][ru]", BLANK),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Divide(1.058),
    },
    CategoryStrategy {
        node_id: "1142",
        name: "Arknights",
        fields: &[
            ("fields[type]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("fields[payment_msg][ru]", BLANK),
            ("fields[payment_msg][en]", BLANK),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Passthrough,
    },
    CategoryStrategy {
        node_id: "1560",
        name: "Asphalt",
        fields: &[
            ("server_id", Fixed("9074")),
            ("fields[method]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", EMPTY),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", EMPTY),
            ("fields[payment_msg][ru]", BLANK),
            ("fields[payment_msg][en]", BLANK),
            ("fields[images]", EMPTY),
            ("price", Price),
        ],
        price_rule: PriceRule::Divide(1.10),
    },
    CategoryStrategy {
        node_id: "1127",
        name: "Brawl Stars",
        fields: &[
            ("fields[method]", Choice),
            ("fields[type]", Choice),
            ("fields[type2]", Choice),
            ("fields[brawlpass]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[desc][ru]", Description(Ru)),
            ("deactivate_after_sale", BLANK),
            ("price", Price),
        ],
        price_rule: PriceRule::Divide(1.1914),
    },
    CategoryStrategy {
        node_id: "1130",
        name: "Clash Royale",
        fields: &[
            ("fields[method]", Choice),
            ("fields[type]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[desc][ru]", Description(Ru)),
            ("deactivate_after_sale", BLANK),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Divide(1.140),
    },
    CategoryStrategy {
        node_id: "1129",
        name: "Clash of Clans",
        fields: &[
            ("fields[method]", Choice),
            ("fields[type]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[desc][ru]", Description(Ru)),
            ("deactivate_after_sale", BLANK),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Divide(1.140),
    },
    CategoryStrategy {
        node_id: "1135",
        name: "RAID: Shadow Legends",
        fields: &[
            ("fields[type]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Divide(1.17),
    },
    CategoryStrategy {
        node_id: "1697",
        name: "Mortal Kombat Mobile",
        fields: &[
            ("fields[type]", Choice),
            ("fields[quantity]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("deactivate_after_sale", BLANK),
        ],
        price_rule: PriceRule::Divide(1.099),
    },
    CategoryStrategy {
        node_id: "1755",
        name: "Zooba",
        fields: &[
            ("fields[topup]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[desc][ru]", Description(Ru)),
            ("price", Price),
            ("deactivate_after_sale", BLANK),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Divide(1.099),
    },
    CategoryStrategy {
        node_id: "609",
        name: "Star Wars: Galaxy of Heroes",
        fields: &[
            ("server_id", Fixed("3845")),
            ("side_id", Fixed("66")),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("deactivate_after_sale", BLANK),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Divide(1.13),
    },
    CategoryStrategy {
        node_id: "1523",
        name: "EA Sports FC Mobile",
        fields: &[
            ("fields[type]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("deactivate_after_sale", BLANK),
        ],
        price_rule: PriceRule::Divide(1.187),
    },
    CategoryStrategy {
        node_id: "1476",
        name: "Stumble Guys",
        fields: &[
            ("server_id", Fixed("9720")),
            ("fields[type]", Choice),
            ("fields[method]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("deactivate_after_sale", BLANK),
        ],
        price_rule: PriceRule::Passthrough,
    },
    CategoryStrategy {
        node_id: "1133",
        name: "Wild Rift",
        fields: &[
            ("fields[type]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Passthrough,
    },
    CategoryStrategy {
        node_id: "1014",
        name: "League of Legends",
        fields: &[
            ("fields[region]", Choice),
            ("fields[method]", Choice),
            ("fields[quantity]", Choice),
            ("fields[summary][ru]", Summary(Ru)),
            ("fields[summary][en]", Summary(En)),
            ("fields[desc][ru]", Description(Ru)),
            ("fields[desc][en]", Description(En)),
            ("price", Price),
            ("amount", STOCK),
        ],
        price_rule: PriceRule::Passthrough,
    },
];

static BY_NODE_ID: Lazy<HashMap<&'static str, &'static CategoryStrategy>> =
    Lazy::new(|| CATEGORIES.iter().map(|c| (c.node_id, c)).collect());

pub fn strategy(node_id: &str) -> Option<&'static CategoryStrategy> {
    BY_NODE_ID.get(node_id).copied()
}

pub fn is_registered(node_id: &str) -> bool {
    BY_NODE_ID.contains_key(node_id)
}

/// Registered category ids in registry order.
pub fn node_ids() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|c| c.node_id)
}
