//! Agent identities: the closed set of session owners.
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// One of the fixed agent identities a session can belong to. Anything
/// outside this set is rejected at the API boundary, before storage.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    #[serde(rename = "claude-1")]
    Claude1,
    #[serde(rename = "claude-2")]
    Claude2,
    #[serde(rename = "aider-1")]
    Aider1,
    #[serde(rename = "aider-2")]
    Aider2,
}

impl Identity {
    pub const ALL: [Identity; 4] = [
        Identity::Claude1,
        Identity::Claude2,
        Identity::Aider1,
        Identity::Aider2,
    ];

    /// Canonical key, as stored in the database.
    pub fn key(&self) -> &'static str {
        match self {
            Identity::Claude1 => "claude-1",
            Identity::Claude2 => "claude-2",
            Identity::Aider1 => "aider-1",
            Identity::Aider2 => "aider-2",
        }
    }

    /// Short alias accepted on the command line.
    pub fn alias(&self) -> &'static str {
        match self {
            Identity::Claude1 => "cl1",
            Identity::Claude2 => "cl2",
            Identity::Aider1 => "ai1",
            Identity::Aider2 => "ai2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Identity::Claude1 => "Claude-1",
            Identity::Claude2 => "Claude-2",
            Identity::Aider1 => "Aider-1",
            Identity::Aider2 => "Aider-2",
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Identity::Claude1 => "System Architect & Conductor",
            Identity::Claude2 => "Quality Gate & Code Review",
            Identity::Aider1 => "Primary Code Implementation",
            Identity::Aider2 => "Parallel Development & Testing",
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl1" | "claude-1" => Ok(Identity::Claude1),
            "cl2" | "claude-2" => Ok(Identity::Claude2),
            "ai1" | "aider-1" => Ok(Identity::Aider1),
            "ai2" | "aider-2" => Ok(Identity::Aider2),
            _ => Err(Error::InvalidIdentity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_and_keys_parse() {
        assert_eq!("cl1".parse::<Identity>().unwrap(), Identity::Claude1);
        assert_eq!("claude-2".parse::<Identity>().unwrap(), Identity::Claude2);
        assert_eq!("AI1".parse::<Identity>().unwrap(), Identity::Aider1);
        assert_eq!("Aider-2".parse::<Identity>().unwrap(), Identity::Aider2);
    }

    #[test]
    fn anything_else_is_rejected() {
        assert!(matches!(
            "cl3".parse::<Identity>(),
            Err(Error::InvalidIdentity(_))
        ));
        assert!(matches!("".parse::<Identity>(), Err(Error::InvalidIdentity(_))));
    }

    #[test]
    fn key_round_trips() {
        for id in Identity::ALL {
            assert_eq!(id.key().parse::<Identity>().unwrap(), id);
        }
    }
}
