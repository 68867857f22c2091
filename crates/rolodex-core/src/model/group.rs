//! Groups and the system-group snapshot rows consumed by sync.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contact group, either user-created or mirrored from an external
/// contact source.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: Option<i64>,
    pub name: String,
    /// Derived from memberships when read from the store; never
    /// authoritative on writes.
    pub contact_count: i64,
    pub created_at: DateTime<Utc>,
    pub is_system: bool,
    /// Stable identifier within the external source. Always `None` for
    /// user-created groups.
    pub system_id: Option<String>,
    pub account_name: Option<String>,
    pub account_type: Option<String>,
}

impl Group {
    /// Creates an unpersisted user-created group.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            contact_count: 0,
            created_at: Utc::now(),
            is_system: false,
            system_id: None,
            account_name: None,
            account_type: None,
        }
    }
}

/// One group as reported by an external contact source.
///
/// Snapshot rows are ephemeral: they exist for the duration of a sync
/// pass and carry no local identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemGroup {
    #[serde(default)]
    pub system_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub contact_count: i64,
}

const fn default_visible() -> bool {
    true
}

impl SystemGroup {
    /// Collapses snapshot rows that list one well-known group once per
    /// account.
    ///
    /// Rows are keyed by a non-empty `system_id`, falling back to the
    /// title; the two key kinds never collide with each other. The
    /// first row wins every field except `contact_count`, which is
    /// summed across duplicates. The result is ordered by title.
    #[must_use]
    pub fn dedup(groups: Vec<SystemGroup>) -> Vec<SystemGroup> {
        let total = groups.len();
        let mut merged: HashMap<String, SystemGroup> = HashMap::new();

        for group in groups {
            let key = match group.system_id.as_deref() {
                Some(id) if !id.is_empty() => format!("system:{id}"),
                _ => format!("title:{}", group.title),
            };
            match merged.entry(key) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().contact_count += group.contact_count;
                }
                Entry::Vacant(entry) => {
                    entry.insert(group);
                }
            }
        }

        if merged.len() < total {
            tracing::debug!(rows = total, merged = merged.len(), "merged duplicate snapshot rows");
        }

        let mut result: Vec<SystemGroup> = merged.into_values().collect();
        result.sort_by(|a, b| {
            a.title
                .cmp(&b.title)
                .then_with(|| a.system_id.cmp(&b.system_id))
        });
        result
    }
}
