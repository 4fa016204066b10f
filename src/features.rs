//! Orthographic feature computation.
//!
//! The lexicon treats these as an opaque fixed-size payload; this module is
//! the one concrete producer of that payload used by [`crate::Lexicon::get`].
//! Callers that need a different feature set can bypass it entirely via
//! [`crate::Lexicon::set`].

/// Fixed-width opaque feature payload stored on every [`crate::lexicon::Lexeme`].
pub type FeaturePayload = [u8; 16];

const FLAG_ALPHA: u8 = 1 << 0;
const FLAG_DIGIT: u8 = 1 << 1;
const FLAG_PUNCT: u8 = 1 << 2;
const FLAG_SPACE: u8 = 1 << 3;
const FLAG_UPPER: u8 = 1 << 4;
const FLAG_TITLE: u8 = 1 << 5;
const FLAG_LIKE_NUM: u8 = 1 << 6;

/// Compute the default orthographic features for a surface form.
///
/// Byte 0 holds boolean flags; bytes 1-2 hold the character length of the
/// surface form, clamped to `u16::MAX`; the remaining bytes are reserved
/// and zeroed.
#[must_use]
pub fn compute_features(surface: &str) -> FeaturePayload {
    let mut payload = [0u8; 16];
    let mut flags = 0u8;

    if !surface.is_empty() {
        if surface.chars().all(char::is_alphabetic) {
            flags |= FLAG_ALPHA;
        }
        if surface.chars().all(|c| c.is_ascii_digit()) {
            flags |= FLAG_DIGIT;
        }
        if surface.chars().all(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
            flags |= FLAG_PUNCT;
        }
        if surface.chars().all(char::is_whitespace) {
            flags |= FLAG_SPACE;
        }
        if surface.chars().all(|c| !c.is_lowercase()) && surface.chars().any(char::is_alphabetic) {
            flags |= FLAG_UPPER;
        }
        let mut chars = surface.chars();
        if let Some(first) = chars.next() {
            if first.is_uppercase() && chars.all(|c| !c.is_uppercase()) {
                flags |= FLAG_TITLE;
            }
        }
        if looks_like_number(surface) {
            flags |= FLAG_LIKE_NUM;
        }
    }

    payload[0] = flags;
    let len = u16::try_from(surface.chars().count()).unwrap_or(u16::MAX);
    payload[1..3].copy_from_slice(&len.to_le_bytes());
    payload
}

fn looks_like_number(surface: &str) -> bool {
    surface.parse::<f64>().is_ok()
}

#[must_use]
pub fn is_alpha(payload: &FeaturePayload) -> bool {
    payload[0] & FLAG_ALPHA != 0
}

#[must_use]
pub fn is_digit(payload: &FeaturePayload) -> bool {
    payload[0] & FLAG_DIGIT != 0
}

#[must_use]
pub fn is_punct(payload: &FeaturePayload) -> bool {
    payload[0] & FLAG_PUNCT != 0
}

#[must_use]
pub fn is_space(payload: &FeaturePayload) -> bool {
    payload[0] & FLAG_SPACE != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_alpha() {
        let p = compute_features("hello");
        assert!(is_alpha(&p));
        assert!(!is_digit(&p));
    }

    #[test]
    fn classifies_digit() {
        let p = compute_features("42");
        assert!(is_digit(&p));
        assert!(!is_alpha(&p));
    }

    #[test]
    fn classifies_punct() {
        let p = compute_features(".");
        assert!(is_punct(&p));
    }

    #[test]
    fn classifies_space() {
        let p = compute_features("  ");
        assert!(is_space(&p));
    }

    #[test]
    fn empty_surface_has_no_flags() {
        let p = compute_features("");
        assert_eq!(p[0], 0);
    }
}
