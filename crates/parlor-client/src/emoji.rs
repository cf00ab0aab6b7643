//! Reaction emoji validation

use once_cell::sync::Lazy;
use regex::Regex;

// Emoji plus the join/variation machinery multi-codepoint emoji are built
// from (ZWJ sequences, variation selector 16, skin tone components).
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\p{Emoji}|\p{Emoji_Component}|\x{200D}|\x{FE0F})+$")
        .unwrap_or_else(|e| unreachable!("emoji pattern is static: {e}"))
});

const MAX_EMOJI_CHARS: usize = 12;

/// Check that `value` is a single renderable emoji (possibly a ZWJ sequence)
pub fn is_valid_reaction_emoji(value: &str) -> bool {
    !value.is_empty() && value.chars().count() <= MAX_EMOJI_CHARS && EMOJI_RE.is_match(value)
}
