//! Tmux collaborator for inter-agent messaging.
//!
//! Session semantics belong to tmux; this module only lists sessions and
//! delivers guarded text to a target pane.

use crate::error::{Error, Result};
use crate::exec;
use crate::guard::SendGuard;

/// List tmux session names, or an empty list when the server is not running.
pub async fn list_sessions(timeout_secs: u64) -> Result<Vec<String>> {
    let output = exec::run_command(
        "tmux",
        &["list-sessions", "-F", "#{session_name}"],
        None,
        timeout_secs,
    )
    .await?;

    if !output.success() {
        // No server running is not an error for a status view.
        return Ok(Vec::new());
    }

    Ok(output
        .stdout
        .lines()
        .map(str::to_string)
        .filter(|s| !s.is_empty())
        .collect())
}

/// Check whether a tmux session exists.
pub async fn session_exists(target: &str, timeout_secs: u64) -> Result<bool> {
    let output =
        exec::run_command("tmux", &["has-session", "-t", target], None, timeout_secs).await?;
    Ok(output.success())
}

/// Send a message to a tmux session, followed by Enter.
///
/// The guard screens the text first; blocked messages never reach tmux.
pub async fn send_message(
    target: &str,
    text: &str,
    guard: &dyn SendGuard,
    timeout_secs: u64,
) -> Result<()> {
    if !guard.permit(text) {
        tracing::warn!("Message to '{}' blocked by '{}' guard", target, guard.name());
        return Err(Error::Tmux(format!(
            "message blocked by '{}' guard",
            guard.name()
        )));
    }

    if !session_exists(target, timeout_secs).await? {
        return Err(Error::Tmux(format!(
            "No tmux session '{}' found. Is the agent running?",
            target
        )));
    }

    let output =
        exec::run_command("tmux", &["send-keys", "-t", target, text], None, timeout_secs).await?;
    if !output.success() {
        return Err(Error::Tmux(format!(
            "Failed to send to session '{}': {}",
            target,
            output.stderr.trim()
        )));
    }

    let output =
        exec::run_command("tmux", &["send-keys", "-t", target, "Enter"], None, timeout_secs)
            .await?;
    if !output.success() {
        return Err(Error::Tmux(format!(
            "Failed to send Enter to session '{}': {}",
            target,
            output.stderr.trim()
        )));
    }

    tracing::info!("Sent message to tmux session '{}'", target);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::PatternGuard;

    #[tokio::test]
    async fn blocked_message_never_reaches_tmux() {
        let guard = PatternGuard::new(&["rm\\s+-rf".to_string()]).unwrap();
        let err = send_message("any-session", "rm -rf /tmp/x", &guard, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tmux(_)));
        assert!(err.to_string().contains("blocked"));
    }
}
