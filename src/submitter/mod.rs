//! Sequential republishing of backlog offers.
//!
//! Each entry moves `Pending -> Submitting -> Verifying -> Removed`, or ends in
//! `Failed` and stays in the backlog for the next run. Entries are handled one
//! at a time with a fixed pause between submissions; the upstream site throttles
//! and bans bursts of listing creation.

pub mod backlog;
pub mod marketplace;

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::SubmitError;
use crate::models::Offer;
use crate::templates::{self, FormConfig, FormTemplateResolver};

pub use backlog::{Backlog, JsonBacklog, MemoryBacklog};
pub use marketplace::{AuthData, FunPayClient, Marketplace, SubmitResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Submitting,
    Verifying,
    Removed,
    Failed,
}

#[derive(Debug)]
pub struct EntryOutcome {
    pub offer_link: String,
    pub description: String,
    pub state: EntryState,
    pub error: Option<SubmitError>,
}

#[derive(Debug, Default)]
pub struct SubmissionReport {
    pub outcomes: Vec<EntryOutcome>,
}

impl SubmissionReport {
    pub fn removed(&self) -> usize {
        self.count(EntryState::Removed)
    }

    pub fn failed(&self) -> usize {
        self.count(EntryState::Failed)
    }

    fn count(&self, state: EntryState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SubmitterSettings {
    /// Pause between two submissions.
    pub delay: Duration,
    /// Pause between a submission and its listing check.
    pub verify_delay: Duration,
    /// Upper bound for every marketplace call.
    pub call_timeout: Duration,
}

impl SubmitterSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delay: Duration::from_secs(config.submit.delay_seconds),
            verify_delay: Duration::from_secs(config.submit.verify_delay_seconds),
            call_timeout: config.request_timeout(),
        }
    }
}

pub struct Submitter<'a, B: Backlog, M: Marketplace> {
    backlog: &'a B,
    marketplace: &'a M,
    resolver: &'a FormTemplateResolver,
    form_config: FormConfig,
    settings: SubmitterSettings,
}

impl<'a, B: Backlog, M: Marketplace> Submitter<'a, B, M> {
    pub fn new(
        backlog: &'a B,
        marketplace: &'a M,
        resolver: &'a FormTemplateResolver,
        form_config: FormConfig,
        settings: SubmitterSettings,
    ) -> Self {
        Self {
            backlog,
            marketplace,
            resolver,
            form_config,
            settings,
        }
    }

    /// Backlog entries that can be attempted: complete offers in a category
    /// with both a strategy and a harvested template.
    pub async fn pending(&self) -> Result<Vec<Offer>> {
        let offers = self.backlog.load().await?;
        Ok(offers
            .into_iter()
            .filter(|o| {
                !o.desc_text.trim().is_empty()
                    && !o.price.trim().is_empty()
                    && self.resolver.supports(&o.node_id)
            })
            .collect())
    }

    /// Work through the pending entries once. Only a failure to read the
    /// backlog aborts the run; per-entry failures are reported.
    pub async fn run(&self) -> Result<SubmissionReport> {
        let pending = self.pending().await?;
        info!("{} backlog entries pending", pending.len());

        let mut report = SubmissionReport::default();
        for (idx, offer) in pending.iter().enumerate() {
            if idx > 0 {
                sleep(self.settings.delay).await;
            }

            let outcome = self.process(offer).await;
            match (&outcome.state, &outcome.error) {
                (EntryState::Removed, _) => info!("Published: {}", outcome.description),
                (_, Some(e)) => error!("Failed to publish {}: {}", outcome.description, e),
                _ => {}
            }
            report.outcomes.push(outcome);
        }

        info!(
            "Submission run finished: {} published, {} failed",
            report.removed(),
            report.failed()
        );
        Ok(report)
    }

    async fn process(&self, offer: &Offer) -> EntryOutcome {
        let mut outcome = EntryOutcome {
            offer_link: offer.offer_link.clone(),
            description: offer.desc_text.clone(),
            state: EntryState::Pending,
            error: None,
        };

        match self.submit_and_verify(offer, &mut outcome.state).await {
            Ok(()) => match self.backlog.remove(&offer.offer_link).await {
                Ok(true) => outcome.state = EntryState::Removed,
                Ok(false) => {
                    warn!("{} was already gone from the backlog", offer.offer_link);
                    outcome.state = EntryState::Removed;
                }
                Err(e) => {
                    error!("Published {} but could not update backlog: {:#}", offer.offer_link, e);
                    outcome.state = EntryState::Failed;
                }
            },
            Err(e) => {
                outcome.state = EntryState::Failed;
                outcome.error = Some(e);
            }
        }
        outcome
    }

    async fn submit_and_verify(&self, offer: &Offer, state: &mut EntryState) -> Result<(), SubmitError> {
        let form = self
            .resolver
            .get_form_data(offer, &self.form_config)
            .ok_or_else(|| SubmitError::Form(format!("no template for node {}", offer.node_id)))?;

        transition(offer, state, EntryState::Submitting);
        let response = self
            .bounded("offer submission", self.marketplace.create_offer(&form))
            .await?;
        response.check()?;
        if let Some(location) = &response.location {
            debug!("Submission redirected to {}", location);
        }

        transition(offer, state, EntryState::Verifying);
        sleep(self.settings.verify_delay).await;
        let page = self
            .bounded("listing check", self.marketplace.category_page(&offer.node_id))
            .await?;

        let expected = templates::strategy(&offer.node_id)
            .map(|s| s.listing_text(offer))
            .unwrap_or_else(|| offer.desc_text.trim().to_string());
        if !listing_contains(&page, &[expected.as_str()]) {
            return Err(SubmitError::NotVerified {
                node_id: offer.node_id.clone(),
            });
        }

        let price = form.get("price").unwrap_or_default();
        if !price.is_empty() && !listing_contains(&page, &[price]) {
            debug!("Price {} not visible on category page {}", price, offer.node_id);
        }
        Ok(())
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, SubmitError>>,
    ) -> Result<T, SubmitError> {
        match timeout(self.settings.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SubmitError::Timeout {
                operation,
                after: self.settings.call_timeout,
            }),
        }
    }
}

fn transition(offer: &Offer, state: &mut EntryState, next: EntryState) {
    debug!("{}: {:?} -> {:?}", offer.offer_link, state, next);
    *state = next;
}

/// Substring check of the category page, after entity decoding. A match is a
/// best-effort sign the listing went live, not a confirmation.
fn listing_contains(page: &str, needles: &[&str]) -> bool {
    let text = html_escape::decode_html_entities(page);
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| text.contains(n))
}
