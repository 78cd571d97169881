//! Session domain handlers.

use chrono::{TimeZone, Utc};

use crate::error::{Error, Result};
use crate::session::{Identity, SessionStore};

/// `session <action> [...]`. The action and identity tokens arrive already
/// resolved to full vocabulary names.
pub fn handle(store: &mut SessionStore, commands: &[String], freeform: &str) -> Result<()> {
    match commands.get(1).map(String::as_str) {
        Some("start") => start(store, commands.get(2), freeform),
        Some("save") => save(store, commands.get(2), freeform),
        Some("end") => end(store, commands.get(2)),
        Some("list") => list(store),
        Some(other) => Err(Error::Usage(format!(
            "Unknown session action: {}\nAvailable actions: start, save, end, list",
            other
        ))),
        None => {
            print_usage();
            Err(Error::Usage(
                "Session command requires an action: start, save, end or list".to_string(),
            ))
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  crew session start <identity> [-- name]   Start a new session");
    println!("  crew session save [<identity>] [-- msg]   Save a checkpoint");
    println!("  crew session end [<identity>]             End the active session");
    println!("  crew session list                         List recent sessions");
    println!();
    println!("Identities: cl1 (Claude-1), cl2 (Claude-2), ai1 (Aider-1), ai2 (Aider-2)");
}

fn start(store: &mut SessionStore, identity: Option<&String>, freeform: &str) -> Result<()> {
    let identity: Identity = identity
        .ok_or_else(|| {
            Error::Usage("Identity required: crew session start [cl1|cl2|ai1|ai2]".to_string())
        })?
        .parse()?;

    let name = (!freeform.is_empty()).then_some(freeform);
    let id = store.start(identity, name)?;

    println!("Session started");
    println!("  Identity: {} ({})", identity.display_name(), identity.alias());
    println!("  Role: {}", identity.role());
    println!("  Session ID: {}", id);
    if let Some(name) = name {
        println!("  Name: {}", name);
    }
    println!("✓ Session active - use 'crew session save' to log progress");
    Ok(())
}

fn save(store: &mut SessionStore, identity: Option<&String>, freeform: &str) -> Result<()> {
    let identity = resolve_identity(store, identity)?;
    let message = (!freeform.is_empty()).then_some(freeform);
    let id = store.save(identity, message)?;

    println!("Session saved");
    println!("  Identity: {}", identity.display_name());
    println!("  Session ID: {}", id);
    println!("✓ Checkpoint written at {}", format_ts(Utc::now().timestamp_millis()));
    Ok(())
}

fn end(store: &mut SessionStore, identity: Option<&String>) -> Result<()> {
    let identity = resolve_identity(store, identity)?;
    let active = store
        .active_session(identity)?
        .ok_or_else(|| Error::NoActiveSession(identity.key().to_string()))?;
    let id = store.end(identity)?;

    println!("Session ended");
    println!("  Identity: {}", identity.display_name());
    println!("  Session ID: {}", id);
    println!("  Duration: {}", format_duration_since(active.started_at));
    println!("✓ Session completed and logged");
    Ok(())
}

fn list(store: &SessionStore) -> Result<()> {
    let sessions = store.list_sessions(None, 10)?;
    if sessions.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    println!("Recent sessions:");
    for s in sessions {
        println!(
            "  #{:<4} {:<10} {:<10} started {}{}",
            s.id,
            s.identity.key(),
            s.status,
            format_ts(s.started_at),
            s.name.as_deref().map(|n| format!("  ({})", n)).unwrap_or_default()
        );
    }
    Ok(())
}

/// `context`: active sessions and their recent log trail.
pub fn context(store: &SessionStore) -> Result<()> {
    let mut any_active = false;
    for identity in Identity::ALL {
        if let Some(session) = store.active_session(identity)? {
            any_active = true;
            println!(
                "{} - session {} active since {}",
                identity.display_name(),
                session.id,
                format_ts(session.started_at)
            );
            for log in store.session_logs(session.id)?.iter().rev().take(5) {
                println!(
                    "    [{}] {} {}",
                    format_ts(log.ts),
                    log.event_type,
                    log.message.as_deref().unwrap_or("")
                );
            }
        }
    }

    if !any_active {
        println!("No active sessions.");
        println!("Start one with: crew session start [cl1|cl2|ai1|ai2]");
    }
    Ok(())
}

/// Use the given identity token, or infer the single active session.
fn resolve_identity(store: &SessionStore, token: Option<&String>) -> Result<Identity> {
    if let Some(token) = token {
        return token.parse();
    }

    let mut active = Vec::new();
    for identity in Identity::ALL {
        if store.active_session(identity)?.is_some() {
            active.push(identity);
        }
    }
    match active.as_slice() {
        [only] => Ok(*only),
        [] => Err(Error::Usage(
            "No active sessions found. Start one first: crew session start <identity>".to_string(),
        )),
        _ => Err(Error::Usage(
            "Multiple active sessions found. Specify an identity, e.g. 'crew session save cl1'"
                .to_string(),
        )),
    }
}

pub fn format_ts(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

fn format_duration_since(start_millis: i64) -> String {
    let elapsed = (Utc::now().timestamp_millis() - start_millis).max(0) / 1000;
    let hours = elapsed / 3600;
    let minutes = (elapsed % 3600) / 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_inference_needs_exactly_one_active() {
        let mut store = SessionStore::open_in_memory().unwrap();
        assert!(matches!(
            resolve_identity(&store, None),
            Err(Error::Usage(_))
        ));

        store.start(Identity::Claude1, None).unwrap();
        assert_eq!(resolve_identity(&store, None).unwrap(), Identity::Claude1);

        store.start(Identity::Aider1, None).unwrap();
        assert!(matches!(
            resolve_identity(&store, None),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn explicit_identity_token_wins_over_inference() {
        let mut store = SessionStore::open_in_memory().unwrap();
        store.start(Identity::Claude1, None).unwrap();
        let token = "aider-2".to_string();
        assert_eq!(
            resolve_identity(&store, Some(&token)).unwrap(),
            Identity::Aider2
        );
    }

    #[test]
    fn duration_formatting() {
        let now = Utc::now().timestamp_millis();
        assert_eq!(format_duration_since(now), "0m");
        assert_eq!(format_duration_since(now - 90 * 60 * 1000), "1h 30m");
    }
}
