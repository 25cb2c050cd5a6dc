//! Listing-creation form templates.
//!
//! A template describes, per field name, either a literal default or an
//! option-set (submitted value token -> human readable label). Templates are
//! harvested from the marketplace's own edit form and stored in
//! `form_templates.json`, keyed by category id.

pub mod harvest;
pub mod registry;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::models::Offer;
pub use registry::{strategy, CategoryStrategy};

/// Value sent for option fields that could not be resolved.
pub const UNRESOLVED: &str = " ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Literal(String),
    Options(IndexMap<String, String>),
}

pub type FormTemplate = IndexMap<String, FieldSpec>;

/// Runtime values merged into every form.
#[derive(Debug, Clone, Default)]
pub struct FormConfig {
    pub csrf_token: String,
    pub desc_ru: String,
    pub desc_en: String,
}

/// Ordered form body for one listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData(pub Vec<(String, String)>);

impl FormData {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn node_id(&self) -> &str {
        self.get("node_id").unwrap_or_default()
    }

    pub fn to_urlencoded(&self) -> Result<String> {
        serde_urlencoded::to_string(&self.0).context("Failed to encode form body")
    }
}

/// First option-set key whose label is one of the offer's comma separated
/// options. Falls back to a single space when the field has no option-set,
/// the offer has no options, or nothing matches.
pub fn resolve_option_field(template: &FormTemplate, field_name: &str, offer: &Offer) -> String {
    let Some(FieldSpec::Options(choices)) = template.get(field_name) else {
        return UNRESOLVED.to_string();
    };
    let Some(options) = offer.options.as_deref() else {
        return UNRESOLVED.to_string();
    };

    let segments: Vec<&str> = options.split(',').map(str::trim).collect();
    choices
        .iter()
        .find(|(_, label)| segments.contains(&label.as_str()))
        .map(|(key, _)| key.clone())
        .unwrap_or_else(|| UNRESOLVED.to_string())
}

/// Harvested templates keyed by category id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSet(pub HashMap<String, FormTemplate>);

impl TemplateSet {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read form templates from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse form templates in {}", path.display()))
    }

    pub fn get(&self, node_id: &str) -> Option<&FormTemplate> {
        self.0.get(node_id)
    }

    pub fn insert(&mut self, node_id: impl Into<String>, template: FormTemplate) {
        self.0.insert(node_id.into(), template);
    }
}

/// Builds listing form bodies from category strategies and harvested templates.
#[derive(Debug, Clone, Default)]
pub struct FormTemplateResolver {
    templates: TemplateSet,
}

impl FormTemplateResolver {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    /// Whether an offer in `node_id` can be turned into a form at all.
    pub fn supports(&self, node_id: &str) -> bool {
        registry::is_registered(node_id) && self.templates.get(node_id).is_some()
    }

    /// Full form body for `offer`, or `None` when its category has no
    /// registered strategy or no harvested template.
    pub fn get_form_data(&self, offer: &Offer, config: &FormConfig) -> Option<FormData> {
        let Some(category) = strategy(&offer.node_id) else {
            warn!("Unknown node ID: {}", offer.node_id);
            return None;
        };
        let Some(template) = self.templates.get(&offer.node_id) else {
            warn!("Template not found for node ID: {} ({})", offer.node_id, category.name);
            return None;
        };

        let mut fields = vec![
            ("csrf_token".to_string(), config.csrf_token.clone()),
            ("node_id".to_string(), offer.node_id.clone()),
            ("active".to_string(), "on".to_string()),
        ];
        fields.extend(category.resolve_fields(offer, template, config));

        Some(FormData(fields))
    }
}
