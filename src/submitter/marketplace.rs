use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{redirect, Client, ClientBuilder};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::SubmitError;
use crate::templates::FormData;

static APP_DATA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<body[^>]+data-app-data="([^"]+)""#).expect("Invalid app data regex")
});

/// Raw answer of the listing-creation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl SubmitResponse {
    /// 2xx and 3xx count as accepted unless a JSON body carries an error.
    pub fn check(&self) -> Result<(), SubmitError> {
        if !(200..400).contains(&self.status) {
            return Err(SubmitError::Status(self.status));
        }

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&self.body) {
            let error = &json["error"];
            let failed = match error {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(flag) => *flag,
                serde_json::Value::String(msg) => !msg.is_empty(),
                _ => true,
            };
            if failed {
                let message = json["msg"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                return Err(SubmitError::Rejected(message));
            }
        }

        Ok(())
    }
}

/// Listing-creation side of the marketplace.
#[async_trait]
pub trait Marketplace: Send + Sync {
    async fn create_offer(&self, form: &FormData) -> Result<SubmitResponse, SubmitError>;

    /// HTML of the public trade page of a category.
    async fn category_page(&self, node_id: &str) -> Result<String, SubmitError>;
}

/// Session needed to post as the seller.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthData {
    pub cookies: String,
    pub csrf_token: String,
}

pub struct FunPayClient {
    client: Client,
    base_url: String,
    cookies: String,
}

impl FunPayClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookies: config.auth.cookies.clone(),
        })
    }

    pub fn with_session(mut self, auth: &AuthData) -> Self {
        self.cookies = auth.cookies.clone();
        self
    }

    /// Read the csrf token from the home page and merge the session cookies it sets.
    pub async fn fetch_auth(&self) -> Result<AuthData> {
        info!("Fetching marketplace session");
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .header(header::COOKIE, &self.cookies)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .context("Failed to fetch marketplace home page")?;

        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .map(|pair| pair.trim().to_string())
            .collect();

        let html = response.text().await?;
        let csrf_token = extract_csrf_token(&html)?;

        info!("Marketplace session ready (csrf token {})", csrf_token);
        Ok(AuthData {
            cookies: merge_cookies(&self.cookies, &set_cookies),
            csrf_token,
        })
    }

    /// Authenticated offer edit form of a category, the source of its template.
    pub async fn offer_edit_page(&self, node_id: &str) -> Result<String, SubmitError> {
        let response = self
            .client
            .get(format!("{}/lots/offerEdit", self.base_url))
            .query(&[("node", node_id)])
            .headers(self.headers(false))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubmitError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }

    fn headers(&self, is_post: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(cookie) = HeaderValue::from_str(&self.cookies) {
            headers.insert(header::COOKIE, cookie);
        }
        if let Ok(origin) = HeaderValue::from_str(&self.base_url) {
            headers.insert(header::ORIGIN, origin.clone());
            headers.insert(header::REFERER, origin);
        }
        if is_post {
            headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
            headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        } else {
            headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        }
        headers
    }
}

#[async_trait]
impl Marketplace for FunPayClient {
    async fn create_offer(&self, form: &FormData) -> Result<SubmitResponse, SubmitError> {
        let body = form
            .to_urlencoded()
            .map_err(|e| SubmitError::Form(e.to_string()))?;

        let response = self
            .client
            .post(format!("{}/lots/offerSave", self.base_url))
            .headers(self.headers(true))
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        debug!("offerSave answered {} ({} bytes)", status, body.len());

        Ok(SubmitResponse {
            status,
            location,
            body,
        })
    }

    async fn category_page(&self, node_id: &str) -> Result<String, SubmitError> {
        let response = self
            .client
            .get(format!("{}/lots/{}/trade", self.base_url, node_id))
            .headers(self.headers(false))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SubmitError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Csrf token from the `data-app-data` attribute of `<body>`.
pub fn extract_csrf_token(html: &str) -> Result<String> {
    let raw = APP_DATA_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .ok_or_else(|| anyhow!("data-app-data not found on page"))?
        .as_str();

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .context("data-app-data is not valid UTF-8")?;
    let unescaped = html_escape::decode_html_entities(&decoded);
    let app_data: serde_json::Value =
        serde_json::from_str(&unescaped).context("data-app-data is not valid JSON")?;

    app_data["csrf-token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no csrf-token in data-app-data"))
}

fn merge_cookies(configured: &str, set_cookies: &[String]) -> String {
    let mut pairs: Vec<String> = configured
        .split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    for cookie in set_cookies {
        let name = cookie.split('=').next().unwrap_or_default();
        pairs.retain(|p| p.split('=').next().unwrap_or_default() != name);
        pairs.push(cookie.clone());
    }
    pairs.join("; ")
}
