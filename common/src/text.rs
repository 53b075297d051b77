//! # Name Normalization
//!
//! TM names are typed by operators on keyboards that may or may not carry the
//! Turkish letters. Every comparison between a search term and an inventory
//! name goes through [`normalize`] so `Bağcılar`, `bagcilar` and `BAGCILAR`
//! all meet at the same key.

const FOLDED_FROM: [char; 12] = ['ğ', 'ü', 'ş', 'ı', 'ö', 'ç', 'Ğ', 'Ü', 'Ş', 'İ', 'Ö', 'Ç'];
const FOLDED_TO: [char; 12] = ['g', 'u', 's', 'i', 'o', 'c', 'G', 'U', 'S', 'I', 'O', 'C'];

/// Replaces the Turkish letters with their ASCII base letter.
pub fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match FOLDED_FROM.iter().position(|&f| f == c) {
            Some(idx) => FOLDED_TO[idx],
            None => c,
        })
        .collect()
}

/// Comparison key for names: accents folded, then upper-cased.
pub fn normalize(text: &str) -> String {
    fold_accents(text).to_uppercase()
}

/// Normalized substring containment.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    normalize(haystack).contains(&normalize(needle))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
