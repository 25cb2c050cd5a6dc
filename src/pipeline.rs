//! The compare, harvest and watch runs, wired from scrapers, stores and clients.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::try_join;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{DifferenceKind, Offer};
use crate::reconcile::{new_offers, reconcile, Reconciliation};
use crate::scrapers::StorefrontScraper;
use crate::storage::{
    JsonStore, CURRENT_OFFERS_FILE, DIFFERENCES_FILE, FORM_TEMPLATES_FILE, NEW_OFFERS_FILE,
    NEW_OFFERS_HISTORY_FILE, OWN_OFFERS_FILE, PROFILE_NAMES_FILE, RIVAL_OFFERS_FILE,
};
use crate::submitter::{Backlog, FunPayClient};
use crate::templates::{harvest::parse_form_template, registry, TemplateSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileNames {
    pub user_1: String,
    pub user_2: String,
}

/// One batch of newly seen offers in the watch history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffersEntry {
    pub detected_at: DateTime<Utc>,
    pub offers: Vec<Offer>,
}

/// Scrape both sellers, reconcile them and replace the backlog with the
/// ADD ME subset.
pub async fn compare(
    config: &Config,
    client: &Client,
    store: &JsonStore,
    backlog: &impl Backlog,
) -> Result<Reconciliation> {
    let scraper = StorefrontScraper::new(config);
    let (own, rival) = try_join(
        scraper.scrape(client, &config.sellers.own),
        scraper.scrape(client, &config.sellers.rival),
    )
    .await?;

    store.write(OWN_OFFERS_FILE, &own.offers).await?;
    store.write(RIVAL_OFFERS_FILE, &rival.offers).await?;
    store
        .write(
            PROFILE_NAMES_FILE,
            &ProfileNames {
                user_1: own.profile_name,
                user_2: rival.profile_name,
            },
        )
        .await?;

    let result = reconcile(&own.offers, &rival.offers);
    store.write(DIFFERENCES_FILE, &result.records).await?;
    backlog.replace(result.offers_to_add()).await?;

    info!(
        "Compared {} vs {} offers: {} same, {} add me, {} additional",
        own.offers.len(),
        rival.offers.len(),
        result.count(DifferenceKind::Same),
        result.count(DifferenceKind::AddMe),
        result.count(DifferenceKind::AdditionalLot)
    );
    Ok(result)
}

/// Harvest the edit form of every registered category, one at a time, and
/// merge the new templates over the stored ones.
pub async fn harvest(client: &FunPayClient, store: &JsonStore, delay: Duration) -> Result<TemplateSet> {
    let mut templates: TemplateSet = store.read_or_default(FORM_TEMPLATES_FILE).await?;
    let mut harvested = 0;

    for (idx, node_id) in registry::node_ids().enumerate() {
        if idx > 0 {
            sleep(delay).await;
        }

        info!("Harvesting form template for node {}", node_id);
        let html = match client.offer_edit_page(node_id).await {
            Ok(html) => html,
            Err(e) => {
                error!("Failed to fetch edit form for node {}: {}", node_id, e);
                continue;
            }
        };

        match parse_form_template(&html) {
            Some(template) => {
                templates.insert(node_id, template);
                harvested += 1;
            }
            None => warn!("No template for node {}, keeping the stored one", node_id),
        }
    }

    store.write(FORM_TEMPLATES_FILE, &templates).await?;
    info!("Harvested {} form templates", harvested);
    Ok(templates)
}

/// One watch pass: scrape the seller, report offers not in the previous
/// snapshot and replace the snapshot.
pub async fn watch_cycle(
    config: &Config,
    client: &Client,
    store: &JsonStore,
    seller_id: &str,
) -> Result<Vec<Offer>> {
    let page = StorefrontScraper::new(config).scrape(client, seller_id).await?;
    let previous: Vec<Offer> = store.read_or_default(CURRENT_OFFERS_FILE).await?;

    let fresh = new_offers(&previous, &page.offers);
    if fresh.is_empty() {
        info!("No new offers for {}", seller_id);
    } else {
        info!("Found {} new offers for {}", fresh.len(), seller_id);
        store.write(NEW_OFFERS_FILE, &fresh).await?;

        let mut history: Vec<NewOffersEntry> = store.read_or_default(NEW_OFFERS_HISTORY_FILE).await?;
        history.push(NewOffersEntry {
            detected_at: Utc::now(),
            offers: fresh.clone(),
        });
        store.write(NEW_OFFERS_HISTORY_FILE, &history).await?;
    }

    store.write(CURRENT_OFFERS_FILE, &page.offers).await?;
    Ok(fresh)
}
