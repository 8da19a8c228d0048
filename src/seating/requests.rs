use indexmap::IndexMap;
use tracing::{debug, trace};

use super::matching::{ExactToken, NameMatcher};
use super::types::{dedup_units, RequestMap, Unit};

/// Apostrophe spellings folded to `'` before possessives are stripped. The
/// last one is a right single quote that went through a Latin-1 round trip.
const APOSTROPHES: [&str; 5] = ["\u{2019}", "\u{2018}", "`", "\u{b4}", "\u{e2}\u{20ac}\u{2122}"];

/// Known units grouped by last name, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    by_last_name: IndexMap<String, Vec<Unit>>,
}

impl Directory {
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a Unit>) -> Self {
        let mut directory = Self::default();
        for unit in units {
            directory.insert(unit.clone());
        }
        directory
    }

    pub fn insert(&mut self, unit: Unit) {
        self.by_last_name
            .entry(unit.last_name.clone())
            .or_default()
            .push(unit);
    }

    pub fn last_names(&self) -> impl Iterator<Item = &str> {
        self.by_last_name.keys().map(String::as_str)
    }

    pub fn candidates(&self, last_name: &str) -> &[Unit] {
        self.by_last_name
            .get(last_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Lowercases the text, strips possessive endings from whole words, drops
/// the remaining punctuation and splits on whitespace.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut text = text.to_lowercase();
    for apostrophe in APOSTROPHES {
        text = text.replace(apostrophe, "'");
    }
    text.split_whitespace().filter_map(normalize_word).collect()
}

fn normalize_word(word: &str) -> Option<String> {
    let word = word
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !c.is_alphanumeric() && c != '\'');
    let word = word
        .strip_suffix("'s")
        .or_else(|| word.strip_suffix('\''))
        .unwrap_or(word);
    let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Normalizes a directory name the way request tokens are normalized, minus
/// the possessive handling.
pub fn normalize_name(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Turns free-text seating requests into units from a [`Directory`].
pub struct RequestResolver<'a> {
    directory: &'a Directory,
    matcher: &'a dyn NameMatcher,
}

impl<'a> RequestResolver<'a> {
    pub fn new(directory: &'a Directory, matcher: &'a dyn NameMatcher) -> Self {
        Self { directory, matcher }
    }

    #[cfg(test)]
    pub fn exact(directory: &'a Directory) -> Self {
        Self::new(directory, &ExactToken)
    }

    /// Units mentioned in `text`, deduplicated in discovery order. Ambiguous
    /// last names yield every candidate; nothing found yields an empty list.
    pub fn resolve(&self, text: &str) -> Vec<Unit> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }
        trace!(?tokens, "tokenized request");

        let mut matched = Vec::new();
        for last_name in self.directory.last_names() {
            let name = normalize_name(last_name);
            if !self.matcher.matches(&name, &tokens) {
                continue;
            }
            let found = disambiguate(self.directory.candidates(last_name), &tokens);
            debug!(
                last_name,
                candidates = self.directory.candidates(last_name).len(),
                chosen = found.len(),
                "detected last name"
            );
            matched.extend(found);
        }
        dedup_units(matched)
    }
}

/// Narrows same-last-name candidates by the first names found in the text.
/// A single named first name picks its first registration only; several
/// named first names keep every match; none keeps all candidates.
fn disambiguate(candidates: &[Unit], tokens: &[String]) -> Vec<Unit> {
    if candidates.len() == 1 {
        return candidates.to_vec();
    }
    let named: Vec<&Unit> = candidates
        .iter()
        .filter(|u| ExactToken.matches(&normalize_name(&u.first_name), tokens))
        .collect();
    let mut first_names: Vec<Vec<String>> = named.iter().map(|u| normalize_name(&u.first_name)).collect();
    first_names.sort();
    first_names.dedup();

    match first_names.len() {
        0 => candidates.to_vec(),
        1 => vec![named[0].clone()],
        _ => named.into_iter().cloned().collect(),
    }
}

/// Resolves every unit's request text, in unit order. A unit naming its own
/// family does not request itself.
pub fn build_request_map<'u>(
    entries: impl IntoIterator<Item = (&'u Unit, &'u str)>,
    resolver: &RequestResolver<'_>,
) -> RequestMap {
    let mut requests = RequestMap::new();
    for (unit, text) in entries {
        let targets: Vec<Unit> = resolver
            .resolve(text)
            .into_iter()
            .filter(|target| target.key != unit.key)
            .collect();
        if !targets.is_empty() {
            debug!(
                unit = %unit.key,
                targets = ?targets.iter().map(|t| t.key.to_string()).collect::<Vec<_>>(),
                "resolved request"
            );
        }
        requests.insert(unit.clone(), targets);
    }
    requests
}
