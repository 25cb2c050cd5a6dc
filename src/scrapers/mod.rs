mod storefront;

pub use storefront::{parse_storefront, SellerPage, StorefrontScraper};
