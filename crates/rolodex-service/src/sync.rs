//! Group reconciliation against an external system-group snapshot.

use std::collections::HashSet;

use chrono::Utc;

use rolodex_core::constants::{FAVORITES_GROUP, LEGACY_STARRED_GROUP};
use rolodex_core::model::{Group, SystemGroup};
use rolodex_db::Store;

use crate::error::ServiceResult;

/// Source of the authoritative system-group snapshot.
pub trait SystemGroupProvider {
    /// ## Errors
    /// Returns an error when the snapshot cannot be produced. Callers treat
    /// that as "no sync data" and leave the cache untouched.
    fn system_groups(&self) -> anyhow::Result<Vec<SystemGroup>>;
}

/// The disjoint change sets produced by [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Snapshot groups with no local counterpart, not yet persisted.
    pub insert: Vec<Group>,
    /// Matched cached groups whose observable fields drifted from the
    /// snapshot, carrying their local ids.
    pub update: Vec<Group>,
    /// Cached system groups the snapshot no longer reports.
    pub delete: Vec<Group>,
}

impl SyncPlan {
    /// True when applying the plan would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// What a sync pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The snapshot source was unavailable; the cache was left untouched.
    Skipped { reason: String },
    /// The plan was applied; all zeros when the cache was already in sync.
    Applied {
        inserted: usize,
        updated: usize,
        deleted: usize,
    },
}

/// ## Summary
/// Diffs the authoritative snapshot against the cached groups and returns
/// the sets whose application makes the cache mirror the snapshot.
///
/// Matching tries, in order: equal non-null `system_id`, the
/// (name, account name, account type) identity tuple of a cached system
/// group, and the one-time rename of the legacy starred group to
/// "Favorites". Each cached row is consumed by at most one snapshot row, so
/// duplicate cached rows collapse to a single update and the rest fall out
/// as orphans.
///
/// User-created groups never match and are never deleted. An empty snapshot
/// produces an empty plan: "no sync data" must not be read as "every group
/// was removed upstream".
#[must_use]
pub fn reconcile(system_groups: &[SystemGroup], database_groups: &[Group]) -> SyncPlan {
    let mut plan = SyncPlan::default();
    let mut consumed: HashSet<usize> = HashSet::new();

    for snapshot in system_groups {
        let matched = database_groups
            .iter()
            .enumerate()
            .find(|&(index, cached)| {
                !consumed.contains(&index) && matches_snapshot(snapshot, cached)
            });

        match matched {
            Some((index, cached)) => {
                consumed.insert(index);
                if drifted(snapshot, cached) {
                    plan.update.push(refreshed(snapshot, cached));
                }
            }
            None => plan.insert.push(inserted(snapshot)),
        }
    }

    if !system_groups.is_empty() {
        for (index, cached) in database_groups.iter().enumerate() {
            if cached.is_system && !consumed.contains(&index) {
                plan.delete.push(cached.clone());
            }
        }
    }

    plan
}

fn matches_snapshot(snapshot: &SystemGroup, cached: &Group) -> bool {
    // User-created groups are invisible to matching, whatever they are
    // named.
    if !cached.is_system {
        return false;
    }
    if cached.system_id.is_some() && cached.system_id == snapshot.system_id {
        return true;
    }
    if cached.name == snapshot.title
        && cached.account_name == snapshot.account_name
        && cached.account_type == snapshot.account_type
    {
        return true;
    }
    cached.name == LEGACY_STARRED_GROUP && snapshot.title == FAVORITES_GROUP
}

fn drifted(snapshot: &SystemGroup, cached: &Group) -> bool {
    cached.name != snapshot.title
        || cached.contact_count != snapshot.contact_count
        || cached.account_name != snapshot.account_name
        || cached.account_type != snapshot.account_type
}

/// The matched cached group, refreshed from the snapshot. Keeps the local
/// id and creation stamp; backfills `system_id` for rows matched by the
/// identity tuple or the legacy rename.
fn refreshed(snapshot: &SystemGroup, cached: &Group) -> Group {
    Group {
        id: cached.id,
        name: snapshot.title.clone(),
        contact_count: snapshot.contact_count,
        created_at: cached.created_at,
        is_system: true,
        system_id: snapshot.system_id.clone(),
        account_name: snapshot.account_name.clone(),
        account_type: snapshot.account_type.clone(),
    }
}

fn inserted(snapshot: &SystemGroup) -> Group {
    Group {
        id: None,
        name: snapshot.title.clone(),
        contact_count: snapshot.contact_count,
        created_at: Utc::now(),
        is_system: true,
        system_id: snapshot.system_id.clone(),
        account_name: snapshot.account_name.clone(),
        account_type: snapshot.account_type.clone(),
    }
}

/// ## Summary
/// Runs one full sync pass: snapshot fetch, dedup, reconcile, and the
/// all-or-nothing application of the resulting plan. An empty plan skips
/// the persistence transaction entirely.
///
/// ## Errors
/// Returns an error when reading the cache or applying the plan fails. A
/// provider failure is not an error: it is logged and reported as
/// [`SyncOutcome::Skipped`].
#[tracing::instrument(skip(store, provider))]
pub fn sync_groups(
    store: &mut Store,
    provider: &dyn SystemGroupProvider,
) -> ServiceResult<SyncOutcome> {
    let snapshot = match provider.system_groups() {
        Ok(groups) => SystemGroup::dedup(groups),
        Err(err) => {
            tracing::warn!(error = %err, "system group snapshot unavailable, skipping sync");
            return Ok(SyncOutcome::Skipped {
                reason: err.to_string(),
            });
        }
    };

    let cached = store.list_groups()?;
    let plan = reconcile(&snapshot, &cached);
    if plan.is_empty() {
        tracing::debug!("group cache already in sync");
        return Ok(SyncOutcome::Applied {
            inserted: 0,
            updated: 0,
            deleted: 0,
        });
    }

    let delete_ids: Vec<i64> = plan.delete.iter().filter_map(|group| group.id).collect();
    if let Err(err) = store.sync_groups(&plan.insert, &plan.update, &delete_ids) {
        tracing::error!(error = %err, "failed to apply group sync plan");
        return Err(err.into());
    }

    tracing::info!(
        inserted = plan.insert.len(),
        updated = plan.update.len(),
        deleted = plan.delete.len(),
        "group sync applied"
    );
    Ok(SyncOutcome::Applied {
        inserted: plan.insert.len(),
        updated: plan.update.len(),
        deleted: plan.delete.len(),
    })
}
