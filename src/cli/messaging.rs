//! Inter-agent messaging handler.

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::guard;
use crate::session::Identity;
use crate::tmux;

/// `crew <identity> -- <message>`: deliver the free string to the identity's
/// tmux session.
pub async fn send(settings: &Settings, identity: Identity, message: &str) -> Result<()> {
    if message.is_empty() {
        return Err(Error::Usage(format!(
            "Message required: crew {} -- <message>",
            identity.alias()
        )));
    }

    let guard = guard::from_config(&settings.guard)?;
    let target = settings
        .messaging
        .targets
        .get(identity.key())
        .cloned()
        .unwrap_or_else(|| identity.key().to_string());

    tmux::send_message(
        &target,
        message,
        guard.as_ref(),
        settings.messaging.send_timeout_secs,
    )
    .await?;

    println!(
        "✓ Message delivered to {} (tmux session '{}')",
        identity.display_name(),
        target
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_message_is_a_usage_error() {
        let settings = Settings::default();
        let err = send(&settings, Identity::Claude1, "").await.unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[tokio::test]
    async fn guarded_message_is_blocked_before_delivery() {
        let mut settings = Settings::default();
        settings.guard.mode = "pattern".to_string();
        settings.guard.deny_patterns = vec!["rm\\s+-rf".to_string()];

        let err = send(&settings, Identity::Claude1, "rm -rf /srv")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tmux(_)));
    }
}
