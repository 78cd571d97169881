//! Outbound message guard capability.
//!
//! Whether outbound text is screened is a visible configuration choice
//! (`guard.mode` in settings), not an artifact of what happened to load.

use regex::Regex;

use crate::config::GuardConfig;
use crate::error::{Error, Result};

/// Screens text before it is sent to another agent's terminal.
pub trait SendGuard: Send + Sync {
    /// True if the text may be sent.
    fn permit(&self, text: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// The no-op default: everything is permitted.
pub struct AllowAll;

impl SendGuard for AllowAll {
    fn permit(&self, _text: &str) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "allow_all"
    }
}

/// Denies any text matching one of the configured patterns.
pub struct PatternGuard {
    patterns: Vec<Regex>,
}

impl PatternGuard {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| Error::Config(format!("bad guard pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }
}

impl SendGuard for PatternGuard {
    fn permit(&self, text: &str) -> bool {
        !self.patterns.iter().any(|p| p.is_match(text))
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}

/// Build the guard selected in settings.
pub fn from_config(config: &GuardConfig) -> Result<Box<dyn SendGuard>> {
    match config.mode.as_str() {
        "allow_all" => Ok(Box::new(AllowAll)),
        "pattern" => Ok(Box::new(PatternGuard::new(&config.deny_patterns)?)),
        other => Err(Error::Config(format!("unknown guard mode: {}", other))),
    }
}
