use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::{FieldSpec, FormTemplate};

/// Form fields looked up on the offer edit page.
const KNOWN_FIELDS: &[&str] = &[
    "csrf_token",
    "node_id",
    "server_id",
    "side_id",
    "fields[region]",
    "fields[topup]",
    "fields[method]",
    "fields[game]",
    "fields[quantity]",
    "fields[type]",
    "fields[type2]",
    "fields[type3]",
    "fields[brawlpass]",
    "fields[summary][ru]",
    "fields[summary][en]",
    "fields[desc][ru]",
    "fields[desc][en]",
    "amount",
    "active",
    "price",
    "deactivate_after_sale",
];

const REQUIRED_FIELDS: &[&str] = &["csrf_token", "node_id", "active", "price"];

/// Shown instead of the form when the seller already has offers in the category.
const MULTIPLE_OFFERS_WARNING: &str = "У вас уже есть предложения";

/// Build a category template from the offer edit page.
///
/// Returns `None` when the page shows the multiple-offers warning instead of a form.
pub fn parse_form_template(html: &str) -> Option<FormTemplate> {
    let document = Html::parse_document(html);

    if let Ok(alert_selector) = Selector::parse(".alert.alert-warning") {
        let warning: String = document
            .select(&alert_selector)
            .flat_map(|el| el.text())
            .collect();
        if warning.contains(MULTIPLE_OFFERS_WARNING) {
            warn!("Edit page shows the multiple offers warning, no template");
            return None;
        }
    }

    let mut template = FormTemplate::new();
    for field_name in KNOWN_FIELDS {
        let Ok(selector) = Selector::parse(&format!("[name=\"{}\"]", field_name)) else {
            continue;
        };
        let Some(element) = document.select(&selector).next() else {
            debug!("{} - field not found", field_name);
            continue;
        };

        let spec = if element.value().name() == "select" {
            FieldSpec::Options(select_options(element))
        } else {
            FieldSpec::Literal(String::new())
        };
        template.insert(field_name.to_string(), spec);
    }

    for field_name in REQUIRED_FIELDS {
        template
            .entry(field_name.to_string())
            .or_insert_with(|| FieldSpec::Literal(String::new()));
    }

    Some(template)
}

fn select_options(select: ElementRef) -> IndexMap<String, String> {
    let mut options = IndexMap::new();
    let Ok(option_selector) = Selector::parse("option") else {
        return options;
    };

    for option in select.select(&option_selector) {
        let Some(value) = option.value().attr("value").filter(|v| !v.is_empty()) else {
            continue;
        };
        let label = option.text().collect::<String>().trim().to_string();
        options.insert(value.to_string(), label);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EDIT_PAGE: &str = r#"
        <html><body>
          <form>
            <input type="hidden" name="csrf_token" value="abc">
            <input type="hidden" name="node_id" value="1127">
            <select name="fields[method]">
              <option value="">Выберите</option>
              <option value="1"> С заходом на аккаунт </option>
              <option value="2">Подарком</option>
            </select>
            <textarea name="fields[summary][ru]"></textarea>
            <input name="price" value="">
          </form>
        </body></html>
    "#;

    #[test]
    fn selects_become_option_sets_in_document_order() {
        let template = parse_form_template(EDIT_PAGE).unwrap();

        let keys: Vec<&str> = template.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["csrf_token", "node_id", "fields[method]", "fields[summary][ru]", "price", "active"]
        );

        let mut expected = IndexMap::new();
        expected.insert("1".to_string(), "С заходом на аккаунт".to_string());
        expected.insert("2".to_string(), "Подарком".to_string());
        assert_eq!(template["fields[method]"], FieldSpec::Options(expected));
        assert_eq!(template["fields[summary][ru]"], FieldSpec::Literal(String::new()));
    }

    #[test]
    fn multiple_offers_warning_yields_nothing() {
        let html = r#"<div class="alert alert-warning">У вас уже есть предложения в этой категории</div>"#;
        assert!(parse_form_template(html).is_none());
    }
}
