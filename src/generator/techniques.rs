//! Label-level mutation techniques.
//!
//! Each technique takes a base label (no TLD) and returns its variants in a fixed
//! order. Variants may repeat or be invalid as domain names; filtering happens when
//! they are combined with a TLD.

use super::tables::{
    IDN_HOMOGLYPHS, KEYBOARD_NEIGHBOURS, SUBDOMAIN_PREFIXES, VISUAL_LOOKALIKES, VISUAL_PATTERNS,
};
use crate::config::GeneratorConfig;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Technique {
    Omission,
    Repetition,
    Substitution,
    KeyboardAdjacency,
    VisualConfusable,
    IdnConfusable,
    SubdomainAffix,
}

impl Technique {
    /// Every technique, in the order the generator applies them.
    pub const ALL: [Technique; 7] = [
        Technique::Omission,
        Technique::Repetition,
        Technique::Substitution,
        Technique::KeyboardAdjacency,
        Technique::VisualConfusable,
        Technique::IdnConfusable,
        Technique::SubdomainAffix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Technique::Omission => "omission",
            Technique::Repetition => "repetition",
            Technique::Substitution => "substitution",
            Technique::KeyboardAdjacency => "keyboard-adjacency",
            Technique::VisualConfusable => "visual-confusable",
            Technique::IdnConfusable => "idn-confusable",
            Technique::SubdomainAffix => "subdomain-affix",
        }
    }

    pub fn is_enabled(self, config: &GeneratorConfig) -> bool {
        match self {
            Technique::Omission => config.enable_character_omission,
            Technique::Repetition => config.enable_character_repetition,
            Technique::Substitution => config.enable_character_substitution,
            Technique::KeyboardAdjacency => config.enable_keyboard_typos,
            Technique::VisualConfusable => config.enable_visual_similarity,
            Technique::IdnConfusable => config.enable_idn_confusables,
            Technique::SubdomainAffix => config.enable_subdomain_variations,
        }
    }

    pub fn variants(self, label: &str) -> Vec<String> {
        match self {
            Technique::Omission => omission(label),
            Technique::Repetition => repetition(label),
            Technique::Substitution => substitution(label),
            Technique::KeyboardAdjacency => keyboard_adjacency(label),
            Technique::VisualConfusable => visual_confusable(label),
            Technique::IdnConfusable => idn_confusable(label),
            Technique::SubdomainAffix => subdomain_affix(label),
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The label with position `i` replaced by `with`.
fn replace_at(chars: &[char], i: usize, with: &str) -> String {
    let mut out: String = chars[..i].iter().collect();
    out.push_str(with);
    out.extend(&chars[i + 1..]);
    out
}

/// Remove one character at every position; results shorter than 2 are dropped.
pub fn omission(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    (0..chars.len())
        .map(|i| replace_at(&chars, i, ""))
        .filter(|variant| variant.chars().count() > 1)
        .collect()
}

/// Double every character, and triple every character but the last.
pub fn repetition(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, &ch) in chars.iter().enumerate() {
        variations.push(replace_at(&chars, i, &ch.to_string().repeat(2)));
        if i + 1 < chars.len() {
            variations.push(replace_at(&chars, i, &ch.to_string().repeat(3)));
        }
    }

    variations
}

/// Replace every position with every other letter a-z.
pub fn substitution(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, &ch) in chars.iter().enumerate() {
        for replacement in 'a'..='z' {
            if replacement != ch {
                variations.push(replace_at(&chars, i, &replacement.to_string()));
            }
        }
    }

    variations
}

/// Replace characters with their QWERTY neighbours.
pub fn keyboard_adjacency(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        if let Some(neighbours) = KEYBOARD_NEIGHBOURS.get(ch) {
            for neighbour in neighbours.iter() {
                variations.push(replace_at(&chars, i, &neighbour.to_string()));
            }
        }
    }

    variations
}

/// Per-character look-alikes, then whole-label multi-character patterns.
///
/// Patterns are applied one at a time against the original label, so overlapping
/// patterns each produce their own variant.
pub fn visual_confusable(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        if let Some(lookalikes) = VISUAL_LOOKALIKES.get(ch) {
            for lookalike in lookalikes.iter() {
                variations.push(replace_at(&chars, i, lookalike));
            }
        }
    }

    for (pattern, replacements) in VISUAL_PATTERNS {
        if label.contains(pattern) {
            for replacement in replacements.iter() {
                let variant = label.replace(pattern, replacement);
                if variant != label {
                    variations.push(variant);
                }
            }
        }
    }

    variations
}

/// Replace characters with non-ASCII homoglyphs.
pub fn idn_confusable(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, ch) in chars.iter().enumerate() {
        if let Some(homoglyphs) = IDN_HOMOGLYPHS.get(ch) {
            for homoglyph in homoglyphs.iter() {
                variations.push(replace_at(&chars, i, &homoglyph.to_string()));
            }
        }
    }

    variations
}

/// Four affix patterns per common subdomain prefix.
pub fn subdomain_affix(label: &str) -> Vec<String> {
    let mut variations = Vec::with_capacity(SUBDOMAIN_PREFIXES.len() * 4);

    for prefix in SUBDOMAIN_PREFIXES {
        variations.push(format!("{}-{}", prefix, label));
        variations.push(format!("{}.{}", prefix, label));
        variations.push(format!("{}-{}", label, prefix));
        variations.push(format!("{}{}", prefix, label));
    }

    variations
}
