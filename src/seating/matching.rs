use strsim::jaro_winkler;

/// Decides whether a name (as normalized words) occurs in a tokenized request.
pub trait NameMatcher {
    fn matches(&self, name: &[String], tokens: &[String]) -> bool;
}

/// Whole-token match: every word of the name must appear as a contiguous
/// run of tokens. Never matches inside a longer word.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactToken;

impl NameMatcher for ExactToken {
    fn matches(&self, name: &[String], tokens: &[String]) -> bool {
        if name.is_empty() || tokens.len() < name.len() {
            return false;
        }
        tokens.windows(name.len()).any(|window| window == name)
    }
}

/// Exact match, or any run of tokens whose Jaro-Winkler similarity to the
/// name meets the cutoff. Compares whole tokens only.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyToken {
    cutoff: f64,
}

impl FuzzyToken {
    pub const DEFAULT_CUTOFF: f64 = 0.9;

    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

}

impl Default for FuzzyToken {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CUTOFF)
    }
}

impl NameMatcher for FuzzyToken {
    fn matches(&self, name: &[String], tokens: &[String]) -> bool {
        if ExactToken.matches(name, tokens) {
            return true;
        }
        if name.is_empty() || tokens.len() < name.len() {
            return false;
        }
        let target = name.join(" ");
        tokens
            .windows(name.len())
            .any(|window| jaro_winkler(&target, &window.join(" ")) >= self.cutoff)
    }
}

/// Picks the matcher for the configured mode.
pub fn matcher_for(fuzzy: bool, cutoff: f64) -> Box<dyn NameMatcher + Send + Sync> {
    if fuzzy {
        Box::new(FuzzyToken::new(cutoff))
    } else {
        Box::new(ExactToken)
    }
}
