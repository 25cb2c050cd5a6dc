use anyhow::{bail, Context, Result};
use chrono::Local;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use funpay_inspector::config::Config;
use funpay_inspector::pipeline;
use funpay_inspector::storage::{JsonStore, FORM_TEMPLATES_FILE};
use funpay_inspector::submitter::{
    AuthData, FunPayClient, JsonBacklog, Submitter, SubmitterSettings,
};
use funpay_inspector::templates::{FormTemplateResolver, TemplateSet};
use funpay_inspector::utils::http::create_client;

const HARVEST_DELAY: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("funpay_inspector=info".parse()?),
        )
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "compare".to_string());
    info!("Starting FunPay Inspector ({})", mode);

    let config = Config::load()?;
    let store = JsonStore::new(&config.data_dir);

    match mode.as_str() {
        "compare" => {
            let client = create_client(&config)?;
            let backlog = JsonBacklog::new(store.clone());
            pipeline::compare(&config, &client, &store, &backlog).await?;
        }
        "submit" => submit(&config, &store).await?,
        "harvest" => {
            let (marketplace, _) = authenticated_client(&config).await?;
            pipeline::harvest(&marketplace, &store, HARVEST_DELAY).await?;
        }
        "watch" => watch(&config, &store).await?,
        other => bail!("unknown mode '{}', expected compare, submit, harvest or watch", other),
    }

    Ok(())
}

async fn authenticated_client(config: &Config) -> Result<(FunPayClient, AuthData)> {
    config.require_credentials()?;
    let client = FunPayClient::new(config)?;
    let auth = session(config, &client).await?;
    Ok((client.with_session(&auth), auth))
}

async fn session(config: &Config, client: &FunPayClient) -> Result<AuthData> {
    if !config.auth.csrf_token.is_empty() {
        return Ok(AuthData {
            cookies: config.auth.cookies.clone(),
            csrf_token: config.auth.csrf_token.clone(),
        });
    }
    client
        .fetch_auth()
        .await
        .context("Could not obtain a marketplace session")
}

async fn submit(config: &Config, store: &JsonStore) -> Result<()> {
    let (marketplace, auth) = authenticated_client(config).await?;

    let templates = TemplateSet::load(&store.path(FORM_TEMPLATES_FILE))?;
    let resolver = FormTemplateResolver::new(templates);
    let backlog = JsonBacklog::new(store.clone());

    let submitter = Submitter::new(
        &backlog,
        &marketplace,
        &resolver,
        config.form_config(auth.csrf_token),
        SubmitterSettings::from_config(config),
    );
    let report = submitter.run().await?;

    if report.failed() > 0 {
        error!("{} offers were not published and stay in the backlog", report.failed());
    }
    Ok(())
}

async fn watch(config: &Config, store: &JsonStore) -> Result<()> {
    let client = create_client(config)?;
    let mut interval = interval(Duration::from_secs(config.check_interval_seconds));

    loop {
        interval.tick().await;

        info!("--- Starting new check cycle at {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));

        if let Err(e) = pipeline::watch_cycle(config, &client, store, &config.sellers.own).await {
            error!("Watch cycle failed: {:#}", e);
        }

        info!("Check cycle completed, waiting {} seconds", config.check_interval_seconds);
    }
}
