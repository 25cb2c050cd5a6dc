mod common;

use pretty_assertions::assert_eq;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use funpay_inspector::models::{DifferenceKind, DifferenceRecord, Offer};
use funpay_inspector::pipeline::{self, NewOffersEntry, ProfileNames};
use funpay_inspector::storage::{
    JsonStore, CURRENT_OFFERS_FILE, DIFFERENCES_FILE, FORM_TEMPLATES_FILE, NEW_OFFERS_FILE,
    NEW_OFFERS_HISTORY_FILE, OFFERS_TO_ADD_FILE, PROFILE_NAMES_FILE,
};
use funpay_inspector::submitter::{Backlog, FunPayClient, JsonBacklog};
use funpay_inspector::templates::{FieldSpec, TemplateSet};
use funpay_inspector::utils::http::create_client;

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn compare_writes_report_and_backlog() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = common::config(&server.uri(), tmp.path());

    let own = [
        ("11", "⚡ 30 гемов ⚡, Подарком", "120 ₽"),
        ("12", "Brawl Pass, С заходом на аккаунт", "1 191.4 ₽"),
    ];
    let own_en = [("11", "30 gems, Gift", "120 ₽"), ("12", "Brawl Pass, Login", "1 191.4 ₽")];
    let rival = [
        ("21", "30 ГЕМОВ, Подарком", "100 ₽"),
        ("22", "170 гемов", "700 ₽"),
    ];

    mount_page(&server, "/users/1/", common::storefront("Own", "1127", "Brawl Stars", &own)).await;
    mount_page(&server, "/en/users/1/", common::storefront("Own", "1127", "Brawl Stars", &own_en)).await;
    mount_page(&server, "/users/2/", common::storefront("Rival", "1127", "Brawl Stars", &rival)).await;
    mount_page(&server, "/en/users/2/", common::storefront("Rival", "1127", "Brawl Stars", &rival)).await;

    let client = create_client(&config).unwrap();
    let store = JsonStore::new(tmp.path());
    let backlog = JsonBacklog::new(store.clone());

    let result = pipeline::compare(&config, &client, &store, &backlog).await.unwrap();

    let kinds: Vec<DifferenceKind> = result.records.iter().map(|r| r.kind()).collect();
    assert_eq!(
        kinds,
        vec![DifferenceKind::Same, DifferenceKind::AddMe, DifferenceKind::AdditionalLot]
    );
    match &result.records[0] {
        DifferenceRecord::Same(pair) => assert_eq!(pair.price_difference, "20.00 ₽"),
        other => panic!("expected SAME, got {:?}", other),
    }

    let backlog_entries = backlog.load().await.unwrap();
    assert_eq!(backlog_entries.len(), 1);
    assert_eq!(backlog_entries[0].desc_text, "Brawl Pass");
    assert_eq!(backlog_entries[0].desc_text_en.as_deref(), Some("Brawl Pass"));
    assert_eq!(backlog_entries[0].options.as_deref(), Some("С заходом на аккаунт"));
    assert_eq!(backlog_entries[0].node_id, "1127");
    assert!(store.path(OFFERS_TO_ADD_FILE).exists());

    let names: ProfileNames = store.read(PROFILE_NAMES_FILE).await.unwrap().unwrap();
    assert_eq!(names.user_1, "Own");
    assert_eq!(names.user_2, "Rival");

    let report: serde_json::Value = store.read(DIFFERENCES_FILE).await.unwrap().unwrap();
    assert_eq!(report[0]["differenceType"], "✅✅✅ SAME");
    assert_eq!(report[1]["differenceType"], "❌❌❌ ADD ME");
    assert_eq!(report[2]["differenceType"], "➕➕➕ ADDITIONAL LOT");
}

#[tokio::test]
async fn watch_reports_only_unseen_links() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = common::config(&server.uri(), tmp.path());
    let store = JsonStore::new(tmp.path());

    let previous = vec![Offer {
        desc_text: "30 гемов".to_string(),
        offer_link: format!("{}/lots/offer?id=11", server.uri()),
        ..Default::default()
    }];
    store.write(CURRENT_OFFERS_FILE, &previous).await.unwrap();

    let rows = [("11", "30 гемов", "120 ₽"), ("13", "Brawl Pass", "900 ₽")];
    let page = common::storefront("Own", "1127", "Brawl Stars", &rows);
    mount_page(&server, "/users/1/", page.clone()).await;
    mount_page(&server, "/en/users/1/", page).await;

    let client = create_client(&config).unwrap();
    let fresh = pipeline::watch_cycle(&config, &client, &store, "1").await.unwrap();

    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].desc_text, "Brawl Pass");

    let saved: Vec<Offer> = store.read_or_default(NEW_OFFERS_FILE).await.unwrap();
    assert_eq!(saved, fresh);
    let history: Vec<NewOffersEntry> = store.read_or_default(NEW_OFFERS_HISTORY_FILE).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].offers, fresh);

    let snapshot: Vec<Offer> = store.read_or_default(CURRENT_OFFERS_FILE).await.unwrap();
    assert_eq!(snapshot.len(), 2);

    // Same page again: nothing new, history untouched
    let fresh = pipeline::watch_cycle(&config, &client, &store, "1").await.unwrap();
    assert!(fresh.is_empty());
    let history: Vec<NewOffersEntry> = store.read_or_default(NEW_OFFERS_HISTORY_FILE).await.unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn first_watch_run_only_takes_a_snapshot() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = common::config(&server.uri(), tmp.path());
    let store = JsonStore::new(tmp.path());

    let page = common::storefront("Own", "1127", "Brawl Stars", &[("11", "30 гемов", "120 ₽")]);
    mount_page(&server, "/users/1/", page.clone()).await;
    mount_page(&server, "/en/users/1/", page).await;

    let client = create_client(&config).unwrap();
    let fresh = pipeline::watch_cycle(&config, &client, &store, "1").await.unwrap();

    assert!(fresh.is_empty());
    assert!(!store.path(NEW_OFFERS_FILE).exists());
    let snapshot: Vec<Offer> = store.read_or_default(CURRENT_OFFERS_FILE).await.unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn harvest_keeps_stored_template_when_form_is_blocked() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let config = common::config(&server.uri(), tmp.path());
    let store = JsonStore::new(tmp.path());

    let mut stored = TemplateSet::default();
    stored.insert("1127", serde_json::from_str(r#"{"price": "", "legacy": ""}"#).unwrap());
    store.write(FORM_TEMPLATES_FILE, &stored).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/lots/offerEdit"))
        .and(query_param("node", "1560"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<form>
                 <select name="fields[method]">
                   <option value="">-</option>
                   <option value="7">Подарком</option>
                 </select>
               </form>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/lots/offerEdit"))
        .and(query_param("node", "1127"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="alert alert-warning">У вас уже есть предложения</div>"#,
        ))
        .mount(&server)
        .await;
    // every other category answers 404 and is skipped
    Mock::given(method("GET"))
        .and(path("/lots/offerEdit"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(10)
        .mount(&server)
        .await;

    let client = FunPayClient::new(&config).unwrap();
    let templates = pipeline::harvest(&client, &store, Duration::ZERO).await.unwrap();

    let asphalt = templates.get("1560").unwrap();
    match &asphalt["fields[method]"] {
        FieldSpec::Options(options) => {
            assert_eq!(options.len(), 1);
            assert_eq!(options["7"], "Подарком");
        }
        other => panic!("expected an option-set, got {:?}", other),
    }
    assert!(templates.get("1127").unwrap().contains_key("legacy"));
    assert!(templates.get("965").is_none());

    let reloaded = TemplateSet::load(&store.path(FORM_TEMPLATES_FILE)).unwrap();
    assert!(reloaded.get("1560").is_some());
}
