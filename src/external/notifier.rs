// Notification gateway: fire-and-forget broadcast of formatted text

use async_trait::async_trait;
use std::io::Write;

use super::GatewayError;

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to `target`, or to the default audience when `None`
    async fn broadcast(&self, text: &str, target: Option<String>) -> Result<(), GatewayError>;
}

/// Prints group messages for the local console transport
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn broadcast(&self, text: &str, target: Option<String>) -> Result<(), GatewayError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\n[grupo {}]\n{text}\n", target.as_deref().unwrap_or("-")).map_err(|e| {
            GatewayError::Delivery {
                message: e.to_string(),
            }
        })?;
        Ok(())
    }
}
