//! Command chain validation: data-driven dispatch authorization.
#![allow(dead_code)]

/// One accepted operation shape, matched as an elementwise prefix of the
/// resolved sequence. Trailing extra tokens are tolerated and passed through
/// to the handler (e.g. a qualifier or an identity).
pub type Pattern = &'static [&'static str];

static PATTERNS: &[Pattern] = &[
    &["help"],
    &["version"],
    &["crew", "help"],
    &["crew", "version"],
    &["crew", "config"],
    &["status"],
    &["config"],
    &["session"],
    &["context"],
    &["git", "push", "homepage"],
    &["git", "push", "crew"],
    &["git", "status"],
    &["git", "logs"],
    &["git", "check"],
    &["exec", "upload", "ppa"],
    &["exec", "upload", "meta"],
    &["exec", "show", "ppa"],
    &["exec", "fix", "gpg"],
    &["exec", "debian"],
    &["claude-1"],
    &["claude-2"],
    &["aider-1"],
    &["aider-2"],
];

/// Validates resolved command sequences against registered patterns before
/// any handler runs.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    patterns: &'static [Pattern],
}

impl ChainValidator {
    /// Validator over the built-in operation shapes.
    pub fn builtin() -> Self {
        Self { patterns: PATTERNS }
    }

    /// Validator over an explicit pattern table (tests).
    pub fn with_patterns(patterns: &'static [Pattern]) -> Self {
        Self { patterns }
    }

    /// First registered pattern that prefix-matches the sequence, if any.
    /// Patterns are tested in registration order; there is no longest-match
    /// semantics.
    pub fn authorize(&self, commands: &[String]) -> Option<Pattern> {
        if commands.is_empty() {
            return None;
        }
        self.patterns
            .iter()
            .copied()
            .find(|&p| prefix_match(p, commands))
    }

    /// True iff some registered pattern authorizes the sequence.
    pub fn validate(&self, commands: &[String]) -> bool {
        self.authorize(commands).is_some()
    }
}

fn prefix_match(pattern: Pattern, commands: &[String]) -> bool {
    pattern.len() <= commands.len() && pattern.iter().zip(commands).all(|(p, c)| c == p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn empty_sequence_is_always_invalid() {
        assert!(!ChainValidator::builtin().validate(&[]));
    }

    #[test]
    fn prefix_match_tolerates_trailing_tokens() {
        let v = ChainValidator::builtin();
        assert!(v.validate(&seq(&["help"])));
        assert!(v.validate(&seq(&["help", "full"])));
        assert!(v.validate(&seq(&["session", "start", "claude-1"])));
        assert!(v.validate(&seq(&["git", "push", "crew", "tests"])));
    }

    #[test]
    fn pattern_longer_than_sequence_does_not_match() {
        let v = ChainValidator::builtin();
        assert!(!v.validate(&seq(&["git", "push"])));
        assert!(!v.validate(&seq(&["exec", "upload"])));
    }

    #[test]
    fn unregistered_shapes_are_rejected() {
        let v = ChainValidator::builtin();
        assert!(!v.validate(&seq(&["git", "pull"])));
        assert!(!v.validate(&seq(&["stop"])));
        assert!(!v.validate(&seq(&["knowledge"])));
    }

    #[test]
    fn first_registered_match_wins() {
        static TABLE: &[Pattern] = &[&["git"], &["git", "push"]];
        let v = ChainValidator::with_patterns(TABLE);
        let matched = v.authorize(&seq(&["git", "push", "crew"])).unwrap();
        assert_eq!(matched, ["git"]);
    }

    #[test]
    fn match_is_independent_of_tokens_beyond_pattern_length() {
        let v = ChainValidator::builtin();
        assert!(v.validate(&seq(&["exec", "debian", "build"])));
        assert!(v.validate(&seq(&["exec", "debian", "anything-else"])));
    }
}
