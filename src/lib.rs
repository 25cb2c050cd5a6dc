pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod pricing;
pub mod reconcile;
pub mod scrapers;
pub mod storage;
pub mod submitter;
pub mod templates;
pub mod utils;
