pub mod difference;
pub mod offer;

pub use difference::*;
pub use offer::*;

// Glyphs used when rendering descriptions and difference labels
pub const GLYPH_CHECK: &str = "✅";
pub const GLYPH_SPARK: char = '✨';
pub const GLYPH_PLUS: char = '➕';

/// Value stored in `options` when an offer carries no secondary segments.
pub const DEFAULT_OPTIONS: &str = "-";

/// Title used when a scraped offer has no category heading.
pub const UNKNOWN_TITLE: &str = "Неизвестный заголовок";
