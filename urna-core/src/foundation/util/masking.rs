//! Display masking for personal identifiers shown on receipts.

const VISIBLE_PREFIX: usize = 3;
const VISIBLE_SUFFIX: usize = 2;
const MASK_CHAR: char = '*';

/// Masks every digit/letter of a national id except the first three and last two.
///
/// Punctuation (`.`, `-`, `/`) is preserved so formatted ids keep their shape.
/// Ids too short to leave anything hidden are masked entirely.
pub fn mask_national_id(national_id: &str) -> String {
    let significant: Vec<usize> =
        national_id.char_indices().filter(|(_, c)| c.is_ascii_alphanumeric()).map(|(idx, _)| idx).collect();
    let total = significant.len();
    let reveal = total > VISIBLE_PREFIX + VISIBLE_SUFFIX;

    let mut out = String::with_capacity(national_id.len());
    let mut seen = 0usize;
    for ch in national_id.chars() {
        if !ch.is_ascii_alphanumeric() {
            out.push(ch);
            continue;
        }
        let visible = reveal && (seen < VISIBLE_PREFIX || seen >= total - VISIBLE_SUFFIX);
        out.push(if visible { ch } else { MASK_CHAR });
        seen += 1;
    }
    out
}
