mod json;

pub use json::JsonStore;

// Snapshot files written under the data directory
pub const OWN_OFFERS_FILE: &str = "user_1.json";
pub const RIVAL_OFFERS_FILE: &str = "user_2.json";
pub const PROFILE_NAMES_FILE: &str = "profile_names.json";
pub const DIFFERENCES_FILE: &str = "differences.json";
pub const OFFERS_TO_ADD_FILE: &str = "offers_to_add.json";
pub const FORM_TEMPLATES_FILE: &str = "form_templates.json";
pub const CURRENT_OFFERS_FILE: &str = "current_offers.json";
pub const NEW_OFFERS_FILE: &str = "new_offers.json";
pub const NEW_OFFERS_HISTORY_FILE: &str = "new_offers_history.json";
