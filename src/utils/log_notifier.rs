use tracing::warn;

use crate::interfaces::notifier::NotifierInterface;

/// Notifier for headless clients, the message only goes to the log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl NotifierInterface for LogNotifier {
    fn notify_error(&self, message: &str) {
        warn!(target: "user_notification", "{message}");
    }
}
