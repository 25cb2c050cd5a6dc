#![allow(dead_code)]

use std::path::Path;

use funpay_inspector::config::{AuthConfig, Config, SellersConfig, SubmitConfig};

pub fn config(base_url: &str, data_dir: &Path) -> Config {
    Config {
        base_url: base_url.to_string(),
        user_agent: "funpay-inspector-tests".to_string(),
        request_timeout_seconds: 5,
        check_interval_seconds: 1,
        data_dir: data_dir.to_path_buf(),
        sellers: SellersConfig {
            own: "1".to_string(),
            rival: "2".to_string(),
        },
        auth: AuthConfig {
            cookies: "golden_key=secret; PHPSESSID=abc".to_string(),
            csrf_token: "tok".to_string(),
            desc_ru: "Описание".to_string(),
            desc_en: "Description".to_string(),
        },
        submit: SubmitConfig {
            delay_seconds: 0,
            verify_delay_seconds: 0,
        },
    }
}

/// Storefront page with one category block holding the given `(id, description, price)` rows.
pub fn storefront(profile: &str, node_id: &str, title: &str, rows: &[(&str, &str, &str)]) -> String {
    let items: String = rows
        .iter()
        .map(|(id, desc, price)| {
            format!(
                r#"<a class="tc-item" href="/lots/offer?id={id}">
                     <div class="tc-desc-text">{desc}</div>
                     <div class="tc-price"><div>{price}</div></div>
                   </a>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
             <div class="profile"><h1><span class="mr4">{profile}</span></h1></div>
             <div class="offer">
               <div class="offer-list-title"><h3><a href="/lots/{node_id}/">{title}</a></h3></div>
               {items}
             </div>
           </body></html>"#
    )
}
