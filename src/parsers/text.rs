use crate::models::{GLYPH_CHECK, GLYPH_PLUS, GLYPH_SPARK};

/// Emoji, dingbats and bullet marks that sellers sprinkle through descriptions.
pub fn is_decorative_glyph(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1FAD6 | 0x2600..=0x26FF | 0x2700..=0x27BF | 0x25AA | 0xFE0E | 0xFE0F
    )
}

/// Comparison key for a free-text description.
///
/// Drops whitespace, decorative glyphs and every `<`, `>` or `|`, then lowercases.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !is_decorative_glyph(*c) && !matches!(c, '<' | '>' | '|'))
        .collect::<String>()
        .to_lowercase()
}

/// Render a description for a listing summary.
///
/// Each run of decorative glyphs (whitespace inside the run included) becomes
/// one spark glyph; the plus marker is kept as is. Runs at either end are
/// dropped and the result is prefixed with a checkmark. Blank input stays empty.
pub fn format_description(text: &str) -> String {
    let is_run_glyph = |c: char| is_decorative_glyph(c) && c != GLYPH_PLUS;
    let chars: Vec<char> = text.trim().chars().collect();
    let mut out = String::with_capacity(text.len());

    let mut i = 0;
    while i < chars.len() {
        if !is_run_glyph(chars[i]) {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let mut end = i + 1;
        let mut j = end;
        while j < chars.len() && (chars[j].is_whitespace() || is_run_glyph(chars[j])) {
            if !chars[j].is_whitespace() {
                end = j + 1;
            }
            j += 1;
        }
        out.push(GLYPH_SPARK);
        i = end;
    }

    let body = out.trim_matches(|c: char| c == GLYPH_SPARK || c.is_whitespace());
    if body.is_empty() {
        String::new()
    } else {
        format!("{} {}", GLYPH_CHECK, body)
    }
}
