//! CLI dispatcher: resolve, validate, route.
//!
//! One invocation runs start-to-finish: the resolver expands abbreviations,
//! the chain validator authorizes the shape, and the first resolved token
//! selects a domain handler. The session store and settings are constructed
//! here and passed down; handlers never reach for globals.

mod configure;
mod gitops;
mod help;
mod messaging;
mod packaging;
mod session;

use crate::config::{self, Settings};
use crate::error::{Error, Result};
use crate::parser::{ChainValidator, ParsedCommand, Resolver, Vocabulary};
use crate::session::{Identity, SessionStore};
use crate::tmux;

pub struct Dispatcher {
    settings: Settings,
    store: SessionStore,
    resolver: Resolver,
    validator: ChainValidator,
}

impl Dispatcher {
    pub fn new(settings: Settings, store: SessionStore) -> Self {
        Self {
            settings,
            store,
            resolver: Resolver::new(Vocabulary::builtin()),
            validator: ChainValidator::builtin(),
        }
    }

    /// Run one invocation. No arguments at all shows the overview and
    /// succeeds, matching the behavior of calling the tool bare.
    pub async fn run(&mut self, args: &[String]) -> Result<()> {
        if args.is_empty() {
            help::print_overview();
            return Ok(());
        }

        let parsed = self.resolver.resolve(args)?;
        display_expansion(args, &parsed);

        let Some(pattern) = self.validator.authorize(&parsed.commands) else {
            return Err(Error::InvalidChain(parsed.commands.join(" ")));
        };
        tracing::debug!("Chain authorized by pattern {:?}", pattern);

        // The self-name token may prefix a command ("crew version").
        let commands: &[String] = match parsed.commands.first().map(String::as_str) {
            Some("crew") if parsed.commands.len() > 1 => &parsed.commands[1..],
            _ => &parsed.commands[..],
        };

        match commands[0].as_str() {
            "help" => {
                help::handle(commands);
                Ok(())
            }
            "version" => help::version(commands, &self.settings),
            "status" => self.status().await,
            "config" => configure::handle(&mut self.settings, commands, &parsed.freeform),
            "session" => session::handle(&mut self.store, commands, &parsed.freeform),
            "context" => session::context(&self.store),
            "git" => gitops::handle(&self.settings, commands, &parsed.freeform).await,
            "exec" => packaging::handle(&self.settings, commands).await,
            other => match other.parse::<Identity>() {
                Ok(identity) => {
                    messaging::send(&self.settings, identity, &parsed.freeform).await
                }
                Err(_) => Err(Error::InvalidChain(parsed.commands.join(" "))),
            },
        }
    }

    /// Store counters, active sessions, and reachable tmux sessions.
    async fn status(&self) -> Result<()> {
        let stats = self.store.stats()?;
        println!("Crew Commander status");
        println!(
            "  Sessions: {} total, {} active, {} log entries",
            stats.total_sessions, stats.active_sessions, stats.total_logs
        );
        if let Some(path) = self.store.path() {
            println!("  Database: {}", path.display());
        }

        for identity in Identity::ALL {
            if let Some(active) = self.store.active_session(identity)? {
                println!(
                    "  {}: session {} active since {}",
                    identity.display_name(),
                    active.id,
                    session::format_ts(active.started_at)
                );
            }
        }

        match tmux::list_sessions(self.settings.messaging.send_timeout_secs).await {
            Ok(sessions) if sessions.is_empty() => println!("  Tmux: no sessions"),
            Ok(sessions) => println!("  Tmux: {}", sessions.join(", ")),
            Err(e) => println!("  Tmux: unavailable ({})", e),
        }

        Ok(())
    }
}

/// Show the expansion when abbreviations changed the invocation.
fn display_expansion(original: &[String], parsed: &ParsedCommand) {
    let original_cmd = original.join(" ");
    let expanded_cmd = parsed.display();
    if original_cmd != expanded_cmd {
        println!("Expanding: '{}' → '{}'", original_cmd, expanded_cmd);
        println!();
    }
}

/// Load settings, open the default store, and dispatch.
pub async fn run(args: Vec<String>) -> Result<()> {
    let settings = config::load_settings_or_default();
    let store = SessionStore::open_default()?;
    let mut dispatcher = Dispatcher::new(settings, store);
    dispatcher.run(&args).await
}
