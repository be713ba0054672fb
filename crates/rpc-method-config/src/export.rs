//! Export of settings into the string parameter map read by the invoker.
//!
//! Which fields are exported, and how, is decided by one table,
//! [`EXPORT_POLICIES`]. Rules:
//!
//! - values are trimmed; unset or blank fields are omitted;
//! - [`ExportRule::Escaped`] values are percent-encoded so delimiter
//!   characters survive the parameter wire format;
//! - [`ExportRule::Transient`] fields are binding metadata and never exported;
//! - extension parameters are merged first with `-` in keys replaced by `.`,
//!   then named fields overwrite any colliding key;
//! - when several extension keys normalize to the same key, a key that was
//!   already written with `.` wins; otherwise the lexicographically smallest
//!   original key wins.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::collections::HashMap;

use crate::settings::{Field, InvocationSettings};

/// How a field contributes to the exported parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRule {
    /// Exported as its plain string form
    Plain,
    /// Exported percent-encoded
    Escaped,
    /// Never exported
    Transient,
}

/// Export policy for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    /// The field
    pub field: Field,
    /// How it is exported
    pub rule: ExportRule,
}

impl FieldPolicy {
    const fn new(field: Field, rule: ExportRule) -> Self {
        Self { field, rule }
    }

    /// Whether the field appears in exported parameters.
    #[must_use]
    pub const fn is_exported(&self) -> bool {
        !matches!(self.rule, ExportRule::Transient)
    }
}

/// Export policy of every field of [`InvocationSettings`].
pub const EXPORT_POLICIES: [FieldPolicy; 12] = [
    FieldPolicy::new(Field::Timeout, ExportRule::Plain),
    FieldPolicy::new(Field::Retries, ExportRule::Plain),
    FieldPolicy::new(Field::Actives, ExportRule::Plain),
    FieldPolicy::new(Field::Loadbalance, ExportRule::Plain),
    FieldPolicy::new(Field::Async, ExportRule::Plain),
    FieldPolicy::new(Field::Sent, ExportRule::Plain),
    FieldPolicy::new(Field::Mock, ExportRule::Escaped),
    FieldPolicy::new(Field::Cache, ExportRule::Plain),
    FieldPolicy::new(Field::Validation, ExportRule::Plain),
    FieldPolicy::new(Field::Forks, ExportRule::Plain),
    FieldPolicy::new(Field::Merger, ExportRule::Plain),
    FieldPolicy::new(Field::Scope, ExportRule::Transient),
];

/// Characters left as-is when escaping; everything else is percent-encoded.
const ESCAPE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'*');

/// Look up the export policy of `field`.
#[must_use]
pub fn policy_for(field: Field) -> FieldPolicy {
    EXPORT_POLICIES
        .iter()
        .copied()
        .find(|policy| policy.field == field)
        .unwrap_or(FieldPolicy::new(field, ExportRule::Transient))
}

/// Percent-encode a parameter value.
#[must_use]
pub fn escape_value(value: &str) -> String {
    utf8_percent_encode(value, ESCAPE_SET).to_string()
}

/// Export `settings` into a fresh parameter map.
///
/// Exporting does not modify `settings`, so repeated calls give identical maps.
#[must_use]
pub fn export_parameters(settings: &InvocationSettings) -> HashMap<String, String> {
    let mut parameters = HashMap::new();
    append_parameters(settings, &mut parameters, None);
    parameters
}

/// Export `settings` into `parameters`.
///
/// With a `prefix`, every key is written as `"{prefix}.{key}"`, which is how
/// method-level settings sit next to service-level ones in a single map.
/// Existing entries under the same keys are overwritten.
pub fn append_parameters(
    settings: &InvocationSettings,
    parameters: &mut HashMap<String, String>,
    prefix: Option<&str>,
) {
    let qualify = |key: &str| match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}.{key}"),
        _ => key.to_string(),
    };
    let before = parameters.len();

    for (key, value) in normalized_extensions(settings) {
        parameters.insert(qualify(&key), value.to_string());
    }

    for policy in EXPORT_POLICIES.iter().filter(|policy| policy.is_exported()) {
        let Some(value) = settings.value_of(policy.field) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let value = match policy.rule {
            ExportRule::Escaped => escape_value(value),
            _ => value.to_string(),
        };
        parameters.insert(qualify(policy.field.name()), value);
    }

    tracing::debug!(
        prefix = prefix.unwrap_or_default(),
        added = parameters.len().saturating_sub(before),
        "Exported invocation parameters"
    );
}

/// Extension parameters with normalized keys, one entry per normalized key.
fn normalized_extensions(settings: &InvocationSettings) -> HashMap<String, &str> {
    let mut entries: Vec<(&String, &String)> = settings.parameters().iter().collect();
    // Literal keys first, then aliases in key order; the first entry per key wins.
    entries.sort_by(|(a, _), (b, _)| (a.contains('-'), a).cmp(&(b.contains('-'), b)));

    let mut normalized = HashMap::with_capacity(entries.len());
    for (key, value) in entries {
        normalized
            .entry(key.replace('-', "."))
            .or_insert(value.as_str());
    }
    normalized
}
