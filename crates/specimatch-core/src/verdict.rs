//! Keyword classification of a free-text verdict.
//!
//! The single-match command prints the model's answer untouched. The
//! evaluation sweep needs a tri-state per record, so it reduces the answer
//! with a keyword rule. Negative phrasings are checked first because every
//! one of them also contains "match".

use serde::{Deserialize, Serialize};

const NEGATIVE_PHRASES: &[&str] = &["no match", "not a match", "does not match", "non-match"];
const POSITIVE_PHRASES: &[&str] = &["is a match", "matches", "match for"];

/// Match/no-match reading of a model answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Match,
    NoMatch,
    Unclear,
}

impl Verdict {
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        if !lower.contains("match") {
            return Self::Unclear;
        }
        if NEGATIVE_PHRASES.iter().any(|p| lower.contains(p)) {
            Self::NoMatch
        } else if POSITIVE_PHRASES.iter().any(|p| lower.contains(p)) {
            Self::Match
        } else {
            Self::Unclear
        }
    }

    /// `Some(true)` for a match, `Some(false)` for no match, `None` when unclear.
    pub fn is_match(&self) -> Option<bool> {
        match self {
            Self::Match => Some(true),
            Self::NoMatch => Some(false),
            Self::Unclear => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Match => write!(f, "MATCH"),
            Verdict::NoMatch => write!(f, "NO MATCH"),
            Verdict::Unclear => write!(f, "UNCLEAR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_verdicts() {
        assert_eq!(Verdict::parse("**NO MATCH**\n\nThe dorsal blotches..."), Verdict::NoMatch);
        assert_eq!(Verdict::parse("This is not a match."), Verdict::NoMatch);
        assert_eq!(Verdict::parse("The candidate does not match."), Verdict::NoMatch);
        assert_eq!(Verdict::parse("Verdict: non-match"), Verdict::NoMatch);
    }

    #[test]
    fn test_positive_verdicts() {
        assert_eq!(Verdict::parse("Verdict: This is a MATCH."), Verdict::Match);
        assert_eq!(Verdict::parse("The candidate matches the reference."), Verdict::Match);
        assert_eq!(Verdict::parse("A clear match for L. annulata"), Verdict::Match);
    }

    #[test]
    fn test_negative_wins_over_positive() {
        // "no match" appears alongside "matches" in the justification
        assert_eq!(
            Verdict::parse("NO MATCH. The head pattern matches, but the body does not."),
            Verdict::NoMatch
        );
    }

    #[test]
    fn test_unclear_verdicts() {
        assert_eq!(Verdict::parse(""), Verdict::Unclear);
        assert_eq!(Verdict::parse("I cannot tell from this photo."), Verdict::Unclear);
        // bare "**MATCH**" contains none of the positive phrases
        assert_eq!(Verdict::parse("**MATCH**"), Verdict::Unclear);
    }

    #[test]
    fn test_is_match() {
        assert_eq!(Verdict::Match.is_match(), Some(true));
        assert_eq!(Verdict::NoMatch.is_match(), Some(false));
        assert_eq!(Verdict::Unclear.is_match(), None);
    }
}
