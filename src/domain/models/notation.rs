//! Notation vocabulary: script tables and token categories.
//!
//! Everything here is constant data. The passes that use it live in
//! `services::notation_formatter`.

use serde::{Deserialize, Serialize};

/// Category of a candidate token recognized in loosely written notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    /// `x squared`, `power(-11)`
    StructuralPhrase,
    /// `_0`, `^{2}`
    ScriptMarker,
    /// `v0`, `H2O`
    SubscriptIdentifier,
    /// `theta`, `Delta`
    GreekLetter,
    /// `times`, `divided by`
    OperatorWord,
    /// `v rms`, `T half`
    Idiom,
}

/// Which small-glyph alphabet a character is encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// Raised above the baseline.
    Superscript,
    /// Lowered below the baseline.
    Subscript,
}

impl Script {
    /// Map a single character into this script.
    ///
    /// Returns `None` when Unicode has no small form for the character.
    pub const fn map_char(self, c: char) -> Option<char> {
        match self {
            Self::Superscript => superscript(c),
            Self::Subscript => subscript(c),
        }
    }

    /// Encode every character of `text`, leaving unmapped characters as they are.
    pub fn encode(self, text: &str) -> String {
        text.chars().map(|c| self.map_char(c).unwrap_or(c)).collect()
    }
}

const fn superscript(c: char) -> Option<char> {
    let mapped = match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'f' => 'ᶠ',
        'g' => 'ᵍ',
        'h' => 'ʰ',
        'i' => 'ⁱ',
        'j' => 'ʲ',
        'k' => 'ᵏ',
        'l' => 'ˡ',
        'm' => 'ᵐ',
        'n' => 'ⁿ',
        'o' => 'ᵒ',
        'p' => 'ᵖ',
        'r' => 'ʳ',
        's' => 'ˢ',
        't' => 'ᵗ',
        'u' => 'ᵘ',
        'v' => 'ᵛ',
        'w' => 'ʷ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        'z' => 'ᶻ',
        'A' => 'ᴬ',
        'B' => 'ᴮ',
        'D' => 'ᴰ',
        'E' => 'ᴱ',
        'G' => 'ᴳ',
        'H' => 'ᴴ',
        'I' => 'ᴵ',
        'J' => 'ᴶ',
        'K' => 'ᴷ',
        'L' => 'ᴸ',
        'M' => 'ᴹ',
        'N' => 'ᴺ',
        'O' => 'ᴼ',
        'P' => 'ᴾ',
        'R' => 'ᴿ',
        'T' => 'ᵀ',
        'U' => 'ᵁ',
        'V' => 'ⱽ',
        'W' => 'ᵂ',
        _ => return None,
    };
    Some(mapped)
}

const fn subscript(c: char) -> Option<char> {
    let mapped = match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    };
    Some(mapped)
}

/// Greek letter names and their glyphs.
///
/// Case-sensitive. Capital forms are listed only where the capital name is
/// unambiguous in exam text (`Pi` and `Sigma` usually mean the bond types).
pub const GREEK_LETTERS: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("iota", "ι"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("omicron", "ο"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("upsilon", "υ"),
    ("phi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Theta", "Θ"),
    ("Lambda", "Λ"),
    ("Phi", "Φ"),
    ("Psi", "Ψ"),
    ("Omega", "Ω"),
];

/// Operator and relation words. Multi-word entries use single spaces; the
/// matcher accepts any run of spaces or tabs between words.
pub const OPERATOR_WORDS: &[(&str, &str)] = &[
    ("times", "×"),
    ("multiplied by", "×"),
    ("divided by", "÷"),
    ("plus or minus", "±"),
    ("plus minus", "±"),
    ("proportional to", "∝"),
    ("approximately equal to", "≈"),
    ("approx", "≈"),
    ("not equal to", "≠"),
    ("less than or equal to", "≤"),
    ("greater than or equal to", "≥"),
    ("much less than", "≪"),
    ("much greater than", "≫"),
    ("infinity", "∞"),
    ("sqrt", "√"),
    ("integral", "∫"),
    ("summation", "Σ"),
    ("nabla", "∇"),
    ("therefore", "∴"),
    ("implies", "⇒"),
    ("tends to", "→"),
    ("angstrom", "Å"),
];

/// Whole-symbol physics and chemistry idioms that do not follow the generic
/// subscript grammar. Matched against text that already went through the
/// Greek and identifier passes, hence `λ max` rather than `lambda max`.
pub const DOMAIN_IDIOMS: &[(&str, &str)] = &[
    ("v rms", "vᵣₘₛ"),
    ("V rms", "Vᵣₘₛ"),
    ("v mp", "vₘₚ"),
    ("T half", "T₁/₂"),
    ("t half", "t₁/₂"),
    ("T₁/2", "T₁/₂"),
    ("t₁/2", "t₁/₂"),
    ("K sp", "Kₛₚ"),
    ("λ max", "λₘₐₓ"),
    ("μ naught", "μ₀"),
    ("ε naught", "ε₀"),
    ("E naught", "E₀"),
    ("Δ H", "ΔH"),
    ("Δ G", "ΔG"),
    ("Δ S", "ΔS"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_have_both_scripts() {
        for d in '0'..='9' {
            assert!(Script::Superscript.map_char(d).is_some(), "superscript {d}");
            assert!(Script::Subscript.map_char(d).is_some(), "subscript {d}");
        }
    }

    #[test]
    fn test_encode_keeps_unmapped_characters() {
        // No subscript glyph exists for 'b' or 'q'
        assert_eq!(Script::Subscript.encode("abq"), "ₐbq");
        assert_eq!(Script::Superscript.encode("-11"), "⁻¹¹");
    }

    #[test]
    fn test_unicode_minus_maps_like_ascii() {
        assert_eq!(Script::Superscript.map_char('−'), Some('⁻'));
        assert_eq!(Script::Subscript.map_char('−'), Some('₋'));
    }

    #[test]
    fn test_tables_have_no_duplicate_keys() {
        for table in [GREEK_LETTERS, OPERATOR_WORDS, DOMAIN_IDIOMS] {
            let mut keys: Vec<_> = table.iter().map(|(k, _)| *k).collect();
            keys.sort_unstable();
            let before = keys.len();
            keys.dedup();
            assert_eq!(before, keys.len());
        }
    }
}
