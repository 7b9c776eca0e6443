//! Builds outbound messages for paging integrations from grouped
//! prometheus alerts.
//!
//! The crate is a pure, synchronous builder: a [channel](channel::NotificationChannel)
//! is constructed once from validated settings, then turns each delivered
//! [alert group](alert::AlertGroup) into a serializable message for the
//! vendor's events API. Delivery itself (HTTP transport, retries) is the
//! caller's business.
//!
//! The only channel type implemented so far is
//! [PagerDuty](pagerduty::PagerDutyChannel).

pub mod alert;
pub mod channel;
pub mod context;
pub mod error;
pub mod pagerduty;
pub mod settings;
pub mod template;

pub use alert::{Alert, AlertGroup, AlertStatus};
pub use channel::{ClientInfo, NotificationChannel};
pub use error::{Error, TemplateError, ValidationError};
pub use pagerduty::{EventAction, PagerDutyChannel, PagerDutyMessage};
