use anyhow::Result;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;
use crate::models::{derive_options, Offer, UNKNOWN_TITLE};
use crate::parsers::clean_text;
use crate::utils::http::fetch_text;

static ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse(".tc-item").expect("Invalid item selector"));
static DESC: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".tc-desc-text").expect("Invalid description selector"));
static PRICE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".tc-price div").expect("Invalid price selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".offer-list-title a").expect("Invalid title selector"));
static PROFILE_NAME: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.profile h1 span.mr4").expect("Invalid profile selector"));

const UNKNOWN_PROFILE: &str = "Not found";

/// Everything read from one seller's storefront.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SellerPage {
    pub profile_name: String,
    pub offers: Vec<Offer>,
}

pub struct StorefrontScraper<'a> {
    config: &'a Config,
}

impl<'a> StorefrontScraper<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Scrape a seller in both locales at once and attach the English
    /// descriptions. Losing the English page only costs `descTextEn`.
    pub async fn scrape(&self, client: &Client, seller_id: &str) -> Result<SellerPage> {
        let ru_url = self.config.seller_url(seller_id);
        let en_url = self.config.seller_url_en(seller_id);
        info!("Scraping seller {}...", seller_id);

        let (ru, en) = tokio::join!(fetch_text(client, &ru_url), fetch_text(client, &en_url));

        let mut page = parse_storefront(&ru?, &self.config.base_url);
        match en {
            Ok(html) => {
                let english = parse_storefront(&html, &self.config.base_url);
                attach_english(&mut page.offers, &english.offers);
            }
            Err(e) => warn!("English storefront unavailable for {}: {}", seller_id, e),
        }

        info!(
            "Found {} offers for {} ({})",
            page.offers.len(),
            page.profile_name,
            seller_id
        );
        Ok(page)
    }
}

/// Extract the profile name and every offer row of a storefront page.
pub fn parse_storefront(html: &str, base_url: &str) -> SellerPage {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let profile_name = document
        .select(&PROFILE_NAME)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_PROFILE.to_string());

    let offers = document
        .select(&ITEM)
        .map(|item| parse_item(item, base.as_ref()))
        .collect();

    SellerPage { profile_name, offers }
}

fn parse_item(item: ElementRef, base: Option<&Url>) -> Offer {
    let desc_text = first_text(item, &DESC);
    let price = first_text(item, &PRICE);
    let offer_link = item
        .value()
        .attr("href")
        .map(|href| absolutize(href, base))
        .unwrap_or_default();

    let heading = item
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().classes().any(|c| c == "offer"))
        .and_then(|offer| offer.select(&TITLE_LINK).next());

    let title = heading
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let node_id = heading
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| href.split('/').filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string();

    Offer {
        title,
        options: derive_options(&desc_text),
        desc_text,
        desc_text_en: None,
        price,
        node_id,
        offer_link,
    }
}

fn first_text(item: ElementRef, selector: &Selector) -> String {
    item.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn absolutize(href: &str, base: Option<&Url>) -> String {
    match base.and_then(|b| b.join(href).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}

fn attach_english(offers: &mut [Offer], english: &[Offer]) {
    let by_id: HashMap<String, &Offer> = english
        .iter()
        .filter_map(|o| o.listing_id().map(|id| (id, o)))
        .collect();

    for offer in offers.iter_mut() {
        if let Some(en) = offer.listing_id().and_then(|id| by_id.get(&id)) {
            offer.desc_text_en = Some(en.desc_text.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STOREFRONT: &str = r#"
        <html><body>
          <div class="profile"><h1><span class="mr4"> BestRmt </span></h1></div>
          <div class="offer">
            <div class="offer-list-title"><h3><a href="https://funpay.com/lots/1127/">Brawl Stars</a></h3></div>
            <a class="tc-item" href="/lots/offer?id=101">
              <div class="tc-desc-text">30 гемов, Подарком</div>
              <div class="tc-price"><div>120 ₽</div></div>
            </a>
            <a class="tc-item" href="/lots/offer?id=102">
              <div class="tc-desc-text">Brawl Pass</div>
              <div class="tc-price"><div>1 234 ₽</div></div>
            </a>
          </div>
          <a class="tc-item" href="/lots/offer?id=103">
            <div class="tc-desc-text">Orphan</div>
          </a>
        </body></html>
    "#;

    #[test]
    fn parses_offer_rows_with_category() {
        let page = parse_storefront(STOREFRONT, "https://funpay.com");

        assert_eq!(page.profile_name, "BestRmt");
        assert_eq!(page.offers.len(), 3);
        assert_eq!(
            page.offers[0],
            Offer {
                title: "Brawl Stars".to_string(),
                desc_text: "30 гемов, Подарком".to_string(),
                desc_text_en: None,
                price: "120 ₽".to_string(),
                node_id: "1127".to_string(),
                offer_link: "https://funpay.com/lots/offer?id=101".to_string(),
                options: Some("Подарком".to_string()),
            }
        );
        assert_eq!(page.offers[1].options, None);
        assert_eq!(page.offers[1].price, "1 234 ₽");
    }

    #[test]
    fn rows_outside_a_category_get_fallbacks() {
        let page = parse_storefront(STOREFRONT, "https://funpay.com");
        let orphan = &page.offers[2];

        assert_eq!(orphan.title, UNKNOWN_TITLE);
        assert_eq!(orphan.node_id, "");
        assert_eq!(orphan.price, "");
    }

    #[test]
    fn english_descriptions_attach_by_offer_id() {
        let mut offers = parse_storefront(STOREFRONT, "https://funpay.com").offers;
        let english = vec![Offer {
            desc_text: "30 gems, Gift".to_string(),
            offer_link: "https://funpay.com/en/lots/offer?id=101".to_string(),
            ..Default::default()
        }];

        attach_english(&mut offers, &english);
        assert_eq!(offers[0].desc_text_en.as_deref(), Some("30 gems, Gift"));
        assert_eq!(offers[1].desc_text_en, None);
    }

    #[test]
    fn missing_profile_uses_placeholder() {
        let page = parse_storefront("<html><body></body></html>", "https://funpay.com");
        assert_eq!(page.profile_name, UNKNOWN_PROFILE);
        assert!(page.offers.is_empty());
    }
}
