//! Command vocabulary and curated conflict rules.
//!
//! One authoritative table. Entry order is significant: candidate lists keep
//! vocabulary declaration order, and diagnostics echo it.
#![allow(dead_code)]

/// A full command name and the abbreviations it is recognized by.
///
/// Abbreviations are typically successive prefixes of the name, but short
/// aliases (`cl1` for `claude-1`) are allowed.
#[derive(Debug, Clone, Copy)]
pub struct VocabEntry {
    pub name: &'static str,
    pub abbrevs: &'static [&'static str],
}

/// A deliberately ambiguous prefix and the commands it could mean.
///
/// Consulted only when resolution already found more than one candidate, to
/// replace the generic "matches: ..." listing with curated guidance.
#[derive(Debug, Clone, Copy)]
pub struct ConflictRule {
    pub token: &'static str,
    pub commands: &'static [&'static str],
    pub hint: &'static str,
}

static ENTRIES: &[VocabEntry] = &[
    VocabEntry { name: "crew", abbrevs: &["crew"] },
    VocabEntry { name: "git", abbrevs: &["gi", "git"] },
    VocabEntry { name: "push", abbrevs: &["pu", "pus", "push"] },
    VocabEntry { name: "pull", abbrevs: &["pl", "pul", "pull"] },
    VocabEntry { name: "logs", abbrevs: &["lo", "log", "logs"] },
    VocabEntry { name: "check", abbrevs: &["ch", "che", "chec", "check"] },
    VocabEntry { name: "exec", abbrevs: &["ex", "exe", "exec"] },
    VocabEntry { name: "upload", abbrevs: &["up", "upl", "uplo", "uploa", "upload"] },
    VocabEntry { name: "config", abbrevs: &["co", "con", "conf", "confi", "config"] },
    VocabEntry { name: "session", abbrevs: &["se", "ses", "sess", "sessi", "sessio", "session"] },
    VocabEntry { name: "context", abbrevs: &["co", "con", "cont", "conte", "contex", "context"] },
    VocabEntry { name: "help", abbrevs: &["he", "hel", "help"] },
    VocabEntry { name: "full", abbrevs: &["fu", "ful", "full"] },
    VocabEntry { name: "status", abbrevs: &["st", "sta", "stat", "statu", "status"] },
    VocabEntry { name: "start", abbrevs: &["st", "sta", "star", "start"] },
    VocabEntry { name: "stop", abbrevs: &["st", "sto", "stop"] },
    VocabEntry { name: "restart", abbrevs: &["re", "res", "rest", "resta", "restar", "restart"] },
    VocabEntry { name: "list", abbrevs: &["li", "lis", "list"] },
    VocabEntry { name: "test", abbrevs: &["te", "tes", "test"] },
    VocabEntry { name: "tests", abbrevs: &["te", "tes", "test", "tests"] },
    VocabEntry {
        name: "experimental",
        abbrevs: &[
            "ex", "exp", "expe", "exper", "experi", "experim", "experime", "experimen",
            "experiment", "experimenta", "experimental",
        ],
    },
    VocabEntry { name: "show", abbrevs: &["sh", "sho", "show"] },
    VocabEntry { name: "set", abbrevs: &["se", "set"] },
    VocabEntry { name: "mode", abbrevs: &["mo", "mod", "mode"] },
    VocabEntry { name: "homepage", abbrevs: &["ho", "hom", "home", "homep", "homepa", "homepag", "homepage"] },
    VocabEntry { name: "ppa", abbrevs: &["pp", "ppa"] },
    VocabEntry { name: "meta", abbrevs: &["me", "met", "meta"] },
    VocabEntry { name: "crewcmd", abbrevs: &["crewcmd"] },
    VocabEntry { name: "version", abbrevs: &["ve", "ver", "vers", "versi", "versio", "version"] },
    VocabEntry { name: "fix", abbrevs: &["fi", "fix"] },
    VocabEntry { name: "debian", abbrevs: &["de", "deb", "debi", "debia", "debian"] },
    VocabEntry { name: "build", abbrevs: &["bu", "bui", "buil", "build"] },
    VocabEntry { name: "gpg", abbrevs: &["gp", "gpg"] },
    VocabEntry { name: "dev", abbrevs: &["de", "dev"] },
    VocabEntry { name: "pip", abbrevs: &["pi", "pip"] },
    VocabEntry { name: "apt", abbrevs: &["ap", "apt"] },
    // Session sub-commands
    VocabEntry { name: "save", abbrevs: &["sa", "sav", "save"] },
    VocabEntry { name: "end", abbrevs: &["en", "end", "ende"] },
    VocabEntry {
        name: "knowledge",
        abbrevs: &["kn", "know", "knowl", "knowle", "knowled", "knowledg", "knowledge"],
    },
    // Agent identities
    VocabEntry { name: "claude-1", abbrevs: &["cl1", "claude-1"] },
    VocabEntry { name: "claude-2", abbrevs: &["cl2", "claude-2"] },
    VocabEntry { name: "aider-1", abbrevs: &["ai1", "aider-1"] },
    VocabEntry { name: "aider-2", abbrevs: &["ai2", "aider-2"] },
];

static CONFLICTS: &[ConflictRule] = &[
    ConflictRule {
        token: "co",
        commands: &["config", "context"],
        hint: "Use at least 4 characters (conf vs cont)",
    },
    ConflictRule {
        token: "con",
        commands: &["config", "context"],
        hint: "Use at least 4 characters (conf vs cont)",
    },
    ConflictRule {
        token: "pu",
        commands: &["push", "pull"],
        hint: "Use at least 3 characters (pus vs pul)",
    },
    ConflictRule {
        token: "st",
        commands: &["status", "start", "stop"],
        hint: "Use at least 3 characters",
    },
    ConflictRule {
        token: "se",
        commands: &["session", "set"],
        hint: "Use at least 3 characters",
    },
    ConflictRule {
        token: "te",
        commands: &["test", "tests"],
        hint: "Type the full word (test vs tests)",
    },
];

/// The command vocabulary: declaration-ordered entries plus conflict rules.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    entries: &'static [VocabEntry],
    conflicts: &'static [ConflictRule],
}

impl Vocabulary {
    /// The built-in vocabulary of the tool.
    pub fn builtin() -> Self {
        Self {
            entries: ENTRIES,
            conflicts: CONFLICTS,
        }
    }

    pub fn entries(&self) -> &[VocabEntry] {
        self.entries
    }

    /// True if `name` is a registered full command name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Look up a conflict rule by the exact raw token.
    pub fn conflict_for(&self, token: &str) -> Option<&ConflictRule> {
        self.conflicts.iter().find(|c| c.token == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_are_unique() {
        let vocab = Vocabulary::builtin();
        let mut seen = std::collections::HashSet::new();
        for entry in vocab.entries() {
            assert!(seen.insert(entry.name), "duplicate entry: {}", entry.name);
        }
    }

    #[test]
    fn every_name_is_its_own_abbreviation() {
        for entry in Vocabulary::builtin().entries() {
            assert!(
                entry.abbrevs.contains(&entry.name),
                "{} is missing from its own abbreviation list",
                entry.name
            );
        }
    }

    #[test]
    fn conflict_rules_name_registered_commands() {
        let vocab = Vocabulary::builtin();
        for rule in CONFLICTS {
            assert!(rule.commands.len() > 1, "single-command rule: {}", rule.token);
            for cmd in rule.commands {
                assert!(vocab.contains(cmd), "unknown command in rule: {}", cmd);
            }
        }
    }
}
