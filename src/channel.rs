//! shared contract implemented by every notification channel type
use std::fmt;

use serde_json::Value;
use url::Url;

use crate::{alert::AlertGroup, error::Error};

/// Static metadata attached to every outbound message: the name of the
/// sending system, the base url of its UI and the host the process runs on.
///
/// Comes from process-wide configuration and is passed in explicitly, the
/// builders keep no global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub name: String,
    /// base external url, used for client links unless a channel overrides it
    pub url: Url,
    /// host name reported as the event source
    pub source: String,
}

/// A notification channel turns alert groups into vendor messages.
///
/// Implementors validate their settings at construction time and stay
/// immutable afterwards, so one channel value can serve concurrent
/// deliveries. Building performs no I/O, the returned JSON payload is handed
/// to a transport collaborator.
pub trait NotificationChannel: Send + Sync {
    /// the channel type identifier, e.g. `pagerduty`
    fn kind(&self) -> &'static str;

    /// Builds the outbound payload for one alert-group delivery.
    fn build(&self, group: &AlertGroup) -> Result<Value, Error>;
}

impl fmt::Debug for dyn NotificationChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("kind", &self.kind())
            .finish()
    }
}
