//! builds the read-only snapshot exposed to templated fields
use std::collections::BTreeMap;

use url::Url;

use crate::alert::{AlertGroup, AlertStatus};

/// Data exposed to every templated field of one delivery.
///
/// Built fresh per delivery and never mutated afterwards, so all fields of
/// the same message render against the identical snapshot. Keys available
/// inside templates:
///
/// * `status` - `firing` if any alert of the group fires, else `resolved`
/// * `num_firing` / `num_resolved` - subset sizes
/// * `group_key` - the opaque grouping identifier
/// * `group_labels` - labels the group was dispatched under
/// * `common_labels` - labels whose value is identical across all alerts
/// * `common_label_pairs` - the common labels as `key=value` pairs,
///   space-joined, sorted by label name
/// * `group_label_values` / `common_label_values` / `has_extra_labels` -
///   prejoined strings used by the built-in title templates
/// * `external_url` - group-level link, empty string when absent
#[derive(Debug)]
pub struct RenderContext {
    status: AlertStatus,
    num_firing: usize,
    num_resolved: usize,
    context: tera::Context,
}

impl RenderContext {
    /// Computes the snapshot for one alert group.
    pub fn new(group: &AlertGroup) -> Self {
        let num_firing = group.firing().count();
        let num_resolved = group.resolved().count();
        let status = group.status();

        let common_labels = common_labels(group);
        let common_label_pairs = common_labels
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(" ");

        // values of the group labels, sorted by label name
        let group_label_values = {
            let sorted: BTreeMap<&str, &str> = group
                .group_labels
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            sorted.values().copied().collect::<Vec<_>>().join(" ")
        };

        // values of the common labels the group labels don't already name,
        // shown in parentheses by the built-in title templates
        let common_label_values = common_labels
            .iter()
            .filter(|(name, _)| !group.group_labels.contains_key(**name))
            .map(|(_, value)| *value)
            .collect::<Vec<_>>()
            .join(" ");
        let has_extra_labels = common_labels.len() > group.group_labels.len();

        let mut context = tera::Context::new();
        context.insert("status", &status);
        context.insert("num_firing", &num_firing);
        context.insert("num_resolved", &num_resolved);
        context.insert("group_key", &group.group_key);
        context.insert("group_labels", &group.group_labels);
        context.insert("common_labels", &common_labels);
        context.insert("common_label_pairs", &common_label_pairs);
        context.insert("group_label_values", &group_label_values);
        context.insert("common_label_values", &common_label_values);
        context.insert("has_extra_labels", &has_extra_labels);
        context.insert(
            "external_url",
            group.external_url.as_ref().map(Url::as_str).unwrap_or(""),
        );

        Self {
            status,
            num_firing,
            num_resolved,
            context,
        }
    }

    pub fn status(&self) -> AlertStatus {
        self.status
    }

    pub fn num_firing(&self) -> usize {
        self.num_firing
    }

    pub fn num_resolved(&self) -> usize {
        self.num_resolved
    }

    pub(crate) fn tera(&self) -> &tera::Context {
        &self.context
    }
}

/// labels carrying the identical value on every alert of the group, in
/// label-name order
fn common_labels(group: &AlertGroup) -> BTreeMap<&str, &str> {
    let mut alerts = group.alerts.iter();

    let mut common: BTreeMap<&str, &str> = match alerts.next() {
        Some(first) => first
            .labels
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect(),
        None => return BTreeMap::new(),
    };

    for alert in alerts {
        common.retain(|name, value| alert.labels.get(*name).map(String::as_str) == Some(*value));
    }

    common
}
