//! The ten label mutation techniques.
//!
//! Every generator is pure: it takes the label (suffix already stripped) and
//! returns candidates in a fixed order. Callers rely on that order, so new
//! variations must be appended, never interleaved.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::tables;

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];
const BIT_MASK_SLOTS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Technique {
    Addition,
    Omission,
    Repetition,
    Transposition,
    Replacement,
    #[value(name = "vowelswap")]
    VowelSwap,
    Subdomain,
    Hyphenation,
    Bitsquatting,
    Homograph,
}

impl Technique {
    pub const ALL: [Technique; 10] = [
        Technique::Addition,
        Technique::Omission,
        Technique::Repetition,
        Technique::Transposition,
        Technique::Replacement,
        Technique::VowelSwap,
        Technique::Subdomain,
        Technique::Hyphenation,
        Technique::Bitsquatting,
        Technique::Homograph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Technique::Addition => "addition",
            Technique::Omission => "omission",
            Technique::Repetition => "repetition",
            Technique::Transposition => "transposition",
            Technique::Replacement => "replacement",
            Technique::VowelSwap => "vowelswap",
            Technique::Subdomain => "subdomain",
            Technique::Hyphenation => "hyphenation",
            Technique::Bitsquatting => "bitsquatting",
            Technique::Homograph => "homograph",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Technique {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Technique::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown technique: {s}"))
    }
}

/// One generated label, tagged with the technique that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub technique: Technique,
    pub label: String,
}

pub fn generate(technique: Technique, label: &str) -> Vec<String> {
    match technique {
        Technique::Addition => generate_addition(label),
        Technique::Omission => generate_omission(label),
        Technique::Repetition => generate_repetition(label),
        Technique::Transposition => generate_transposition(label),
        Technique::Replacement => generate_replacement(label),
        Technique::VowelSwap => generate_vowel_swapping(label),
        Technique::Subdomain => generate_subdomain_injection(label),
        Technique::Hyphenation => generate_hyphenation(label),
        Technique::Bitsquatting => generate_bitsquatting(label),
        Technique::Homograph => generate_homoglyphs(label),
    }
}

/// Candidates for every technique in `techniques`, concatenated in that order.
/// Labels produced by more than one technique are kept once per technique.
pub fn candidates(techniques: &[Technique], label: &str) -> Vec<Candidate> {
    techniques
        .iter()
        .flat_map(|&technique| {
            generate(technique, label)
                .into_iter()
                .map(move |label| Candidate { technique, label })
        })
        .collect()
}

pub fn count_chars(label: &str) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for c in label.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }
    counts
}

fn replace_at(chars: &[char], i: usize, with: char) -> String {
    let mut out: String = chars[..i].iter().collect();
    out.push(with);
    out.extend(&chars[i + 1..]);
    out
}

fn insert_at(chars: &[char], i: usize, c: char) -> String {
    let mut out: String = chars[..i].iter().collect();
    out.push(c);
    out.extend(&chars[i..]);
    out
}

pub fn generate_addition(label: &str) -> Vec<String> {
    ('a'..='z').map(|c| format!("{}{}", label, c)).collect()
}

pub fn generate_omission(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    (0..chars.len())
        .map(|i| chars[..i].iter().chain(&chars[i + 1..]).collect())
        .collect()
}

pub fn generate_repetition(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut seen = HashSet::new();
    let mut variations = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        if !c.is_alphabetic() {
            continue;
        }
        let repeated = insert_at(&chars, i, *c);
        if seen.insert(repeated.clone()) {
            variations.push(repeated);
        }
    }

    variations
}

pub fn generate_transposition(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for i in 0..chars.len().saturating_sub(1) {
        if chars[i] != chars[i + 1] {
            let mut swapped = chars.clone();
            swapped.swap(i, i + 1);
            variations.push(swapped.into_iter().collect());
        }
    }

    variations
}

pub fn generate_vowel_swapping(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        if !VOWELS.contains(c) {
            continue;
        }
        for vowel in VOWELS.iter().filter(|v| *v != c) {
            variations.push(replace_at(&chars, i, *vowel));
        }
    }

    variations
}

// Inserts at every inner position, next to existing dots and hyphens too.
pub fn generate_subdomain_injection(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    (1..chars.len()).map(|i| insert_at(&chars, i, '.')).collect()
}

pub fn generate_hyphenation(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    (1..chars.len()).map(|i| insert_at(&chars, i, '-')).collect()
}

pub fn generate_replacement(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut seen = HashSet::new();
    let mut variations = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        for key in tables::adjacent_keys(*c) {
            let replaced = replace_at(&chars, i, key);
            if seen.insert(replaced.clone()) {
                variations.push(replaced);
            }
        }
    }

    variations
}

pub fn generate_bitsquatting(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let mut variations = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        // XOR with the slot index itself, so slot 0 reproduces the label.
        for slot in 0..BIT_MASK_SLOTS {
            let flipped = char::from_u32(u32::from(*c) ^ slot)
                .filter(|f| f.is_ascii_lowercase() || f.is_ascii_digit() || *f == '-');
            if let Some(flipped) = flipped {
                variations.push(replace_at(&chars, i, flipped));
            }
        }
    }

    variations
}

/// Per-position glyph substitutions, plus one substitute-every-occurrence
/// pass per glyph for letters that appear more than once.
pub fn generate_homoglyphs(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.chars().collect();
    let counts = count_chars(label);
    let mut swept: HashSet<char> = HashSet::new();
    let mut variations = Vec::new();

    for (i, c) in chars.iter().enumerate() {
        let glyphs = tables::glyphs_for(*c);

        for glyph in glyphs {
            variations.push(replace_at(&chars, i, *glyph));
        }

        if counts.get(c).copied().unwrap_or(0) > 1 && swept.insert(*c) {
            for glyph in glyphs {
                variations.push(
                    chars
                        .iter()
                        .map(|x| if x == c { *glyph } else { *x })
                        .collect(),
                );
            }
        }
    }

    variations
}
