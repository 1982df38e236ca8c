//! Token classification: numbering markers vs. actual content.
//!
//! Markers are the short outline tokens ("a.", "1.", "2.0") that encode a
//! row's list position. The rules are ordered, first match wins; anything
//! longer than four characters is content so long numeric amounts are never
//! mistaken for markers.

/// Tagged classification result, so call sites stay explicit about which
/// side of the ambiguity a token landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Marker,
    Content,
}

impl TokenClass {
    pub fn is_marker(&self) -> bool {
        matches!(self, TokenClass::Marker)
    }
}

/// Classify a single cell token.
pub fn classify(token: &str) -> TokenClass {
    let token = token.trim();
    if token.is_empty() {
        return TokenClass::Content;
    }

    let chars: Vec<char> = token.chars().collect();

    // Long tokens are amounts or names, never markers.
    if chars.len() > 4 {
        return TokenClass::Content;
    }

    // Single letter followed by period: "a.", "b."
    if chars.len() == 2 && chars[1] == '.' && chars[0].is_alphabetic() {
        return TokenClass::Marker;
    }

    // Number followed by period: "1.", "12."
    if chars.len() >= 2
        && chars[chars.len() - 1] == '.'
        && chars[..chars.len() - 1].iter().all(|c| c.is_ascii_digit())
    {
        return TokenClass::Marker;
    }

    // Short decimal numbering: "1.0", "2.0"
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() == 2
        && !parts[0].is_empty()
        && !parts[1].is_empty()
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()))
    {
        return TokenClass::Marker;
    }

    // Bare single character: "a", "1"
    if chars.len() == 1 && (chars[0].is_alphabetic() || chars[0].is_ascii_digit()) {
        return TokenClass::Marker;
    }

    TokenClass::Content
}
