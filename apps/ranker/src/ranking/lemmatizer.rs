//! Rule-based English lemmatizer.
//!
//! Lookup order for every word: invariant forms, then the irregular table, then
//! one suffix rule. Suffix rules are re-applied until none fires, so the result is
//! always a fixed point: `lemmatize(lemmatize(w)) == lemmatize(w)`.
//!
//! Every suffix rule strictly shortens the word, which bounds the loop.

use std::collections::{HashMap, HashSet};

use crate::ranking::lexicon::{INVARIANT_FORMS, IRREGULAR_FORMS};

/// Endings that mark a base form even though the word ends in `s`.
const NON_PLURAL_S_ENDINGS: &[&str] = &["ss", "us", "is", "ics", "ous", "js"];

/// Stem endings that lost a silent `e` when the suffix was added ("creat" -> "create").
const SILENT_E_ENDINGS: &[&str] = &["at", "bl", "iz", "yz", "ut", "v", "c", "ag", "ur", "dg"];

#[derive(Debug, Clone)]
pub struct Lemmatizer {
    irregular: HashMap<&'static str, &'static str>,
    invariant: HashSet<&'static str>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::english()
    }
}

impl Lemmatizer {
    pub fn english() -> Self {
        Self {
            irregular: IRREGULAR_FORMS.iter().copied().collect(),
            invariant: INVARIANT_FORMS.iter().copied().collect(),
        }
    }

    /// Reduces a lowercase alphabetic word to its dictionary base form.
    pub fn lemmatize(&self, word: &str) -> String {
        let mut current = word.to_string();
        loop {
            if self.invariant.contains(current.as_str()) {
                return current;
            }
            if let Some(base) = self.irregular.get(current.as_str()) {
                return (*base).to_string();
            }
            match strip_suffix_once(&current) {
                Some(shorter) => current = shorter,
                None => return current,
            }
        }
    }
}

/// Applies the first matching inflection rule, or `None` if the word looks like a base form.
fn strip_suffix_once(word: &str) -> Option<String> {
    let len = word.chars().count();

    if word.ends_with("ies") && len > 4 {
        return Some(format!("{}y", &word[..word.len() - 3]));
    }
    if word.ends_with("sses") {
        return Some(word[..word.len() - 2].to_string());
    }
    if ["ches", "shes", "xes", "zzes"].iter().any(|s| word.ends_with(s)) && len > 4 {
        return Some(word[..word.len() - 2].to_string());
    }
    if word.ends_with('s') && len > 3 {
        if NON_PLURAL_S_ENDINGS.iter().any(|s| word.ends_with(s)) {
            return None;
        }
        return Some(word[..word.len() - 1].to_string());
    }
    if word.ends_with("ied") && len > 4 {
        return Some(format!("{}y", &word[..word.len() - 3]));
    }
    if word.ends_with("eed") {
        return None;
    }
    if word.ends_with("ed") && len > 4 {
        return restore_stem(&word[..word.len() - 2]);
    }
    if word.ends_with("ing") && len > 5 {
        return restore_stem(&word[..word.len() - 3]);
    }
    None
}

/// Undoes the spelling changes English applies before "-ed" / "-ing".
/// Returns `None` when the stem has no vowel ("string" is not "str" + "ing").
fn restore_stem(stem: &str) -> Option<String> {
    if !has_vowel(stem) {
        return None;
    }

    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();

    // "programm" -> "program", but "install" and "process" keep their doubles
    let last = chars[n - 1];
    if n >= 2 && last == chars[n - 2] && !is_vowel(last) && !"lsz".contains(last) {
        return Some(chars[..n - 1].iter().collect());
    }

    if SILENT_E_ENDINGS.iter().any(|s| stem.ends_with(s)) || is_short_cvc(&chars) {
        return Some(format!("{stem}e"));
    }

    Some(stem.to_string())
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(stem: &str) -> bool {
    stem.chars()
        .enumerate()
        .any(|(i, c)| is_vowel(c) || (c == 'y' && i > 0))
}

/// Three-letter consonant-vowel-consonant stems ("mak", "bas", "cod") drop a final `e`.
fn is_short_cvc(chars: &[char]) -> bool {
    match chars {
        [a, b, c] => {
            a.is_ascii_alphabetic()
                && !is_vowel(*a)
                && is_vowel(*b)
                && c.is_ascii_alphabetic()
                && !is_vowel(*c)
                && !matches!(*c, 'w' | 'x' | 'y')
        }
        _ => false,
    }
}
