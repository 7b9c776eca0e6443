//! data structures for grouped alerts handed to notification channels
use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// firing/resolved state of a single alert, supplied by the grouping
/// subsystem
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertStatus::Firing => f.write_str("firing"),
            AlertStatus::Resolved => f.write_str("resolved"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// a single firing or resolved condition with its labels and annotations
pub struct Alert {
    pub status: AlertStatus,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// url of the rule evaluation that produced the alert, may be empty
    #[serde(rename = "generatorURL", default)]
    pub generator_url: String,
}

impl Alert {
    /// construct a firing alert with empty annotations, handy as a starting
    /// point for callers and tests
    pub fn firing(labels: HashMap<String, String>) -> Self {
        Self {
            status: AlertStatus::Firing,
            labels,
            annotations: HashMap::new(),
            starts_at: None,
            ends_at: None,
            generator_url: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
/// a batch of alerts dispatched together under one group key
///
/// Grouping happens upstream; the order of `alerts` is preserved verbatim
/// when detail blocks are rendered.
pub struct AlertGroup {
    /// opaque grouping identifier, sole input of dedup-key derivation
    pub group_key: String,
    #[serde(default)]
    pub group_labels: HashMap<String, String>,
    pub alerts: Vec<Alert>,
    /// group-level link back to the alerting system, overrides the
    /// process-wide external url when present
    #[serde(rename = "externalURL", default)]
    pub external_url: Option<Url>,
}

impl AlertGroup {
    /// alerts of the firing subset, in group order
    pub fn firing(&self) -> impl Iterator<Item = &Alert> {
        self.alerts
            .iter()
            .filter(|alert| alert.status == AlertStatus::Firing)
    }

    /// alerts of the resolved subset, in group order
    pub fn resolved(&self) -> impl Iterator<Item = &Alert> {
        self.alerts
            .iter()
            .filter(|alert| alert.status == AlertStatus::Resolved)
    }

    /// `Firing` as soon as a single alert of the group fires, `Resolved`
    /// otherwise
    pub fn status(&self) -> AlertStatus {
        if self.firing().next().is_some() {
            AlertStatus::Firing
        } else {
            AlertStatus::Resolved
        }
    }
}
