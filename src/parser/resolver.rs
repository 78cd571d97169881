//! Abbreviation resolver: raw tokens to full command names.

use crate::error::{Error, Result};

use super::vocab::Vocabulary;

/// Free-form separator: everything after it is passed through verbatim.
pub const FREEFORM_SEPARATOR: &str = "--";

/// A fully resolved invocation.
///
/// Option tokens (leading hyphen) appear in `commands` unchanged. Resolution
/// is all-or-nothing: a `ParsedCommand` never carries a partially resolved
/// sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub commands: Vec<String>,
    pub freeform: String,
}

impl ParsedCommand {
    /// The resolved sequence as one displayable string, with the free-form
    /// tail re-attached after the separator.
    pub fn display(&self) -> String {
        let mut out = self.commands.join(" ");
        if !self.freeform.is_empty() {
            out.push_str(" -- ");
            out.push_str(&self.freeform);
        }
        out
    }
}

/// Resolves user tokens against the vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    vocab: Vocabulary,
}

impl Resolver {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Resolve a raw token list into full command names plus the free-form
    /// tail. An empty token list resolves trivially to an empty parse.
    pub fn resolve(&self, tokens: &[String]) -> Result<ParsedCommand> {
        let (command_tokens, freeform) = split_freeform(tokens);

        let mut commands: Vec<String> = Vec::with_capacity(command_tokens.len());
        for (position, token) in command_tokens.iter().enumerate() {
            // Option parameters pass through unresolved.
            if token.starts_with('-') {
                commands.push(token.clone());
                continue;
            }
            let expanded = self.expand(token, position, &commands)?;
            commands.push(expanded.to_string());
        }

        Ok(ParsedCommand { commands, freeform })
    }

    /// Expand a single token, or fail with a precise diagnosis.
    ///
    /// `resolved` is the already-expanded prefix of the invocation; it only
    /// feeds diagnostics, never the resolution itself.
    fn expand(&self, token: &str, position: usize, resolved: &[String]) -> Result<&'static str> {
        // A verbatim full command name wins outright, even when the same
        // string appears in a conflict rule.
        if let Some(entry) = self.vocab.entries().iter().find(|e| e.name == token) {
            return Ok(entry.name);
        }

        // Candidate search: the token must be a prefix of a registered
        // abbreviation, in that direction only. Declaration order is kept.
        let mut candidates: Vec<&'static str> = Vec::new();
        for entry in self.vocab.entries() {
            if entry.abbrevs.iter().any(|a| a.starts_with(token))
                && !candidates.contains(&entry.name)
            {
                candidates.push(entry.name);
            }
        }

        match candidates.len() {
            0 => Err(Error::UnknownCommand {
                token: token.to_string(),
                hint: self.unknown_hint(position, resolved),
            }),
            1 => Ok(candidates[0]),
            _ => {
                if let Some(rule) = self.vocab.conflict_for(token) {
                    Err(Error::AmbiguousCommand {
                        token: token.to_string(),
                        candidates: rule.commands.iter().map(|c| c.to_string()).collect(),
                        hint: rule.hint.to_string(),
                    })
                } else {
                    Err(Error::AmbiguousCommand {
                        token: token.to_string(),
                        candidates: candidates.iter().map(|c| c.to_string()).collect(),
                        hint: "Use more characters for clarity".to_string(),
                    })
                }
            }
        }
    }

    /// Context-sensitive hint for an unknown token.
    fn unknown_hint(&self, position: usize, resolved: &[String]) -> String {
        if position == 0 {
            return "Available commands: crew, git, exec, config, session, context, help, status, version".to_string();
        }

        let first = resolved.iter().find(|t| !t.starts_with('-'));
        if position == 1 {
            return match first.map(String::as_str) {
                Some("git") => "Available git commands: push, status, logs, check".to_string(),
                Some("exec") => "Available exec commands: upload, show, fix, debian".to_string(),
                Some("config") => "Available config commands: show, set, mode".to_string(),
                Some("session") => "Available session actions: start, save, end, list".to_string(),
                _ => "Available commands depend on the first command".to_string(),
            };
        }

        "Use 'crew help' for the complete command reference".to_string()
    }
}

/// Split off the free-form tail at the first separator token. Tokens after it
/// are joined verbatim and never resolved.
fn split_freeform(tokens: &[String]) -> (&[String], String) {
    match tokens.iter().position(|t| t == FREEFORM_SEPARATOR) {
        Some(idx) => (&tokens[..idx], tokens[idx + 1..].join(" ")),
        None => (tokens, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn resolver() -> Resolver {
        Resolver::new(Vocabulary::builtin())
    }

    fn toks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn empty_input_resolves_trivially() {
        let parsed = resolver().resolve(&[]).unwrap();
        assert!(parsed.commands.is_empty());
        assert!(parsed.freeform.is_empty());
    }

    #[test]
    fn abbreviations_expand_to_full_names() {
        let parsed = resolver().resolve(&toks(&["ses", "star", "cl1"])).unwrap();
        assert_eq!(parsed.commands, vec!["session", "start", "claude-1"]);
    }

    #[test]
    fn exact_full_name_bypasses_conflict_rules() {
        // "set" and "start" both sit under conflict prefixes ("se", "st"),
        // but a verbatim full name always resolves to itself.
        let parsed = resolver().resolve(&toks(&["config", "set"])).unwrap();
        assert_eq!(parsed.commands, vec!["config", "set"]);

        let parsed = resolver().resolve(&toks(&["session", "start", "cl2"])).unwrap();
        assert_eq!(parsed.commands, vec!["session", "start", "claude-2"]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = resolver();
        let first = r.resolve(&toks(&["gi", "pus", "ho"])).unwrap();
        assert_eq!(first.commands, vec!["git", "push", "homepage"]);
        let second = r.resolve(&first.commands).unwrap();
        assert_eq!(second.commands, first.commands);
    }

    #[test]
    fn conflict_rule_names_curated_set() {
        let err = resolver().resolve(&toks(&["co"])).unwrap_err();
        match err {
            Error::AmbiguousCommand { token, candidates, .. } => {
                assert_eq!(token, "co");
                assert_eq!(candidates, vec!["config", "context"]);
            }
            other => panic!("expected AmbiguousCommand, got: {}", other),
        }
    }

    #[test]
    fn conflict_rule_for_st_names_exactly_three_commands() {
        let err = resolver().resolve(&toks(&["st"])).unwrap_err();
        match err {
            Error::AmbiguousCommand { candidates, hint, .. } => {
                assert_eq!(candidates, vec!["status", "start", "stop"]);
                assert!(hint.contains("3 characters"));
            }
            other => panic!("expected AmbiguousCommand, got: {}", other),
        }
    }

    #[test]
    fn ambiguity_without_rule_lists_all_candidates() {
        // "ex" hits exec and experimental; no curated rule covers it.
        let err = resolver().resolve(&toks(&["ex"])).unwrap_err();
        match err {
            Error::AmbiguousCommand { candidates, hint, .. } => {
                assert_eq!(candidates, vec!["exec", "experimental"]);
                assert!(hint.contains("more characters"));
            }
            other => panic!("expected AmbiguousCommand, got: {}", other),
        }
    }

    #[test]
    fn option_tokens_pass_through_unresolved() {
        let parsed = resolver().resolve(&toks(&["gi", "stat", "-v"])).unwrap();
        assert_eq!(parsed.commands, vec!["git", "status", "-v"]);
    }

    #[test]
    fn freeform_tail_is_never_resolved() {
        let parsed = resolver()
            .resolve(&toks(&["config", "--", "set", "eMail=dev@example.org"]))
            .unwrap();
        assert_eq!(parsed.commands, vec!["config"]);
        assert_eq!(parsed.freeform, "set eMail=dev@example.org");
    }

    #[test]
    fn freeform_keeps_token_internal_whitespace() {
        let parsed = resolver()
            .resolve(&toks(&["cl1", "--", "review the  spaced   file"]))
            .unwrap();
        assert_eq!(parsed.commands, vec!["claude-1"]);
        assert_eq!(parsed.freeform, "review the  spaced   file");
    }

    #[test]
    fn unknown_token_fails_whole_parse() {
        let err = resolver().resolve(&toks(&["gi", "zz"])).unwrap_err();
        match err {
            Error::UnknownCommand { token, hint } => {
                assert_eq!(token, "zz");
                assert!(hint.contains("git commands"));
            }
            other => panic!("expected UnknownCommand, got: {}", other),
        }
    }

    #[test]
    fn unknown_hint_depends_on_position() {
        let r = resolver();

        let err = r.resolve(&toks(&["zz"])).unwrap_err();
        match err {
            Error::UnknownCommand { hint, .. } => assert!(hint.starts_with("Available commands:")),
            other => panic!("expected UnknownCommand, got: {}", other),
        }

        let err = r.resolve(&toks(&["exec", "zz"])).unwrap_err();
        match err {
            Error::UnknownCommand { hint, .. } => assert!(hint.contains("exec commands")),
            other => panic!("expected UnknownCommand, got: {}", other),
        }

        let err = r.resolve(&toks(&["git", "push", "zz"])).unwrap_err();
        match err {
            Error::UnknownCommand { hint, .. } => assert!(hint.contains("crew help")),
            other => panic!("expected UnknownCommand, got: {}", other),
        }
    }

    #[test]
    fn candidate_direction_is_token_prefix_of_abbreviation() {
        // "sessio" is a prefix of the registered abbreviation "session".
        let parsed = resolver().resolve(&toks(&["sessio"])).unwrap();
        assert_eq!(parsed.commands, vec!["session"]);

        // The reverse direction never matches: no abbreviation starts with it.
        let err = resolver().resolve(&toks(&["sessionx"])).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand { .. }));
    }
}
