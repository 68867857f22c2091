//! Contact and group editing use cases.

use std::collections::{HashMap, HashSet};

use rolodex_core::model::{Contact, Group};
use rolodex_db::Store;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Persists a contact: insert when it has no id, update otherwise.
///
/// Group entries that were never saved are resolved by name against
/// user-created groups, creating missing ones, so imported category names
/// and hand-assembled contacts land on the same rows.
///
/// ## Errors
/// Returns [`ServiceError::CoreError`] when first and last name are both
/// blank, or a database error from persistence.
#[tracing::instrument(skip(store, contact), fields(id = ?contact.id))]
pub fn save_contact(store: &mut Store, contact: &mut Contact) -> ServiceResult<i64> {
    contact.validate()?;

    resolve_groups(store, contact)?;
    match contact.id {
        Some(id) => {
            store.update_contact(contact)?;
            tracing::debug!(id, "contact updated");
            Ok(id)
        }
        None => {
            let id = store.insert_contact(contact)?;
            tracing::debug!(id, "contact inserted");
            Ok(id)
        }
    }
}

/// Replaces unsaved group entries with their stored counterparts, creating
/// user groups that do not exist yet.
pub(crate) fn resolve_groups(store: &Store, contact: &mut Contact) -> ServiceResult<()> {
    for group in &mut contact.groups {
        if group.id.is_some() {
            continue;
        }
        *group = match store.find_user_group(&group.name)? {
            Some(existing) => existing,
            None => {
                let mut created = Group::user(group.name.clone());
                store.insert_group(&mut created)?;
                tracing::debug!(name = %created.name, "created group for contact");
                created
            }
        };
    }
    Ok(())
}

/// ## Summary
/// Persists a group: insert when it has no id, update otherwise.
///
/// ## Errors
/// Returns [`ServiceError::ValidationError`] for a blank name, or a
/// database error from persistence.
#[tracing::instrument(skip(store, group), fields(id = ?group.id, name = %group.name))]
pub fn save_group(store: &Store, group: &mut Group) -> ServiceResult<i64> {
    if group.name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "group name must not be empty".to_string(),
        ));
    }

    match group.id {
        Some(id) => {
            store.update_group(group)?;
            Ok(id)
        }
        None => Ok(store.insert_group(group)?),
    }
}

/// ## Summary
/// Deletes a batch of contacts, skipping ids that no longer exist.
///
/// ## Errors
/// Fails with [`ServiceError::NotFound`] only when zero targets could be
/// removed; otherwise succeeds with the count actually removed.
#[tracing::instrument(skip(store))]
pub fn delete_contacts(store: &mut Store, ids: &[i64]) -> ServiceResult<usize> {
    let removed = store.delete_contacts(ids)?;
    if removed == 0 {
        return Err(ServiceError::NotFound(
            "no contacts matched the given ids".to_string(),
        ));
    }
    tracing::info!(requested = ids.len(), removed, "contacts deleted");
    Ok(removed)
}

/// ## Summary
/// Finds likely duplicate contacts: first groups sharing a
/// case-insensitive first+last name, then groups sharing a digits-only
/// phone number. Each contact is reported in at most one group.
///
/// ## Errors
/// Returns an error when loading contacts fails.
#[tracing::instrument(skip(store))]
pub fn detect_duplicates(store: &Store) -> ServiceResult<Vec<Vec<Contact>>> {
    let contacts = store.list_contacts()?;
    let mut reported: HashSet<usize> = HashSet::new();
    let mut duplicates: Vec<Vec<Contact>> = Vec::new();

    collect_matches(&contacts, name_keys, &mut reported, &mut duplicates);
    collect_matches(&contacts, phone_keys, &mut reported, &mut duplicates);

    Ok(duplicates)
}

/// Buckets contacts by the given keys and appends every bucket that still
/// holds more than one unreported contact, in first-seen order.
fn collect_matches(
    contacts: &[Contact],
    keys: impl Fn(&Contact) -> Vec<String>,
    reported: &mut HashSet<usize>,
    duplicates: &mut Vec<Vec<Contact>>,
) {
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
    let mut key_order: Vec<String> = Vec::new();

    for (index, contact) in contacts.iter().enumerate() {
        if reported.contains(&index) {
            continue;
        }
        for key in keys(contact) {
            let bucket = by_key.entry(key.clone()).or_insert_with(|| {
                key_order.push(key);
                Vec::new()
            });
            if !bucket.contains(&index) {
                bucket.push(index);
            }
        }
    }

    for key in key_order {
        let Some(indices) = by_key.get(&key) else {
            continue;
        };
        let fresh: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|index| !reported.contains(index))
            .collect();
        if fresh.len() > 1 {
            reported.extend(fresh.iter().copied());
            duplicates.push(fresh.iter().map(|&index| contacts[index].clone()).collect());
        }
    }
}

fn name_keys(contact: &Contact) -> Vec<String> {
    let first = contact.first_name.trim().to_lowercase();
    let last = contact.last_name.trim().to_lowercase();
    if first.is_empty() && last.is_empty() {
        return Vec::new();
    }
    vec![format!("{first}|{last}")]
}

fn phone_keys(contact: &Contact) -> Vec<String> {
    contact
        .phone_numbers
        .iter()
        .map(|phone| normalized_number(&phone.number))
        .filter(|digits| !digits.is_empty())
        .collect()
}

fn normalized_number(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use rolodex_core::model::{PhoneNumber, PhoneType};

    use super::*;

    fn named(first: &str, last: &str) -> Contact {
        let mut contact = Contact::new();
        contact.first_name = first.to_string();
        contact.last_name = last.to_string();
        contact
    }

    fn with_phone(first: &str, last: &str, number: &str) -> Contact {
        let mut contact = named(first, last);
        contact
            .phone_numbers
            .push(PhoneNumber::new(number, PhoneType::Mobile));
        contact
    }

    #[test]
    fn save_rejects_blank_names() {
        let mut store = Store::open_in_memory().unwrap();
        let err = save_contact(&mut store, &mut named("  ", "")).unwrap_err();
        assert!(matches!(err, ServiceError::CoreError(_)));

        save_contact(&mut store, &mut named("Ada", "")).unwrap();
    }

    #[test]
    fn save_inserts_then_updates() {
        let mut store = Store::open_in_memory().unwrap();
        let mut contact = named("Ada", "Lovelace");

        let id = save_contact(&mut store, &mut contact).unwrap();
        contact.nickname = Some("Countess".to_string());
        let second = save_contact(&mut store, &mut contact).unwrap();

        assert_eq!(id, second);
        let loaded = store.get_contact(id).unwrap();
        assert_eq!(loaded.nickname.as_deref(), Some("Countess"));
        assert_eq!(store.count_contacts().unwrap(), 1);
    }

    #[test]
    fn save_resolves_group_names_to_shared_rows() {
        let mut store = Store::open_in_memory().unwrap();

        let mut first = named("Ada", "Lovelace");
        first.groups.push(Group::user("Friends"));
        save_contact(&mut store, &mut first).unwrap();
        assert!(first.groups[0].id.is_some());

        let mut second = named("Grace", "Hopper");
        second.groups.push(Group::user("Friends"));
        save_contact(&mut store, &mut second).unwrap();

        assert_eq!(first.groups[0].id, second.groups[0].id);
        assert_eq!(store.list_groups().unwrap().len(), 1);
        let friends = store.find_user_group("Friends").unwrap().unwrap();
        assert_eq!(friends.contact_count, 2);
    }

    #[test]
    fn group_reuse_ignores_name_case() {
        let mut store = Store::open_in_memory().unwrap();
        save_group(&store, &mut Group::user("Friends")).unwrap();

        let mut contact = named("Ada", "Lovelace");
        contact.groups.push(Group::user("friends"));
        save_contact(&mut store, &mut contact).unwrap();

        let groups = store.list_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Friends");
        assert_eq!(contact.groups[0].name, "Friends");
    }

    #[test]
    fn save_group_validates_and_renames() {
        let store = Store::open_in_memory().unwrap();
        let err = save_group(&store, &mut Group::user("   ")).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let mut group = Group::user("Freinds");
        let id = save_group(&store, &mut group).unwrap();
        group.name = "Friends".to_string();
        save_group(&store, &mut group).unwrap();

        assert_eq!(store.get_group(id).unwrap().name, "Friends");
    }

    #[test]
    fn delete_batch_reports_partial_success() {
        let mut store = Store::open_in_memory().unwrap();
        let id = save_contact(&mut store, &mut named("Ada", "Lovelace")).unwrap();

        let removed = delete_contacts(&mut store, &[id, 99]).unwrap();
        assert_eq!(removed, 1);

        let err = delete_contacts(&mut store, &[id, 99]).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn duplicates_match_names_case_insensitively() {
        let mut store = Store::open_in_memory().unwrap();
        save_contact(&mut store, &mut named("Ada", "Lovelace")).unwrap();
        save_contact(&mut store, &mut named("ada", "LOVELACE")).unwrap();
        save_contact(&mut store, &mut named("Grace", "Hopper")).unwrap();

        let duplicates = detect_duplicates(&store).unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].len(), 2);
        assert_eq!(duplicates[0][0].last_name.to_lowercase(), "lovelace");
    }

    #[test]
    fn duplicates_match_normalized_phone_numbers() {
        let mut store = Store::open_in_memory().unwrap();
        save_contact(&mut store, &mut with_phone("Grace", "Hopper", "212-555-0199")).unwrap();
        save_contact(&mut store, &mut with_phone("G", "H", "(212) 555 0199")).unwrap();
        save_contact(&mut store, &mut with_phone("Ada", "Lovelace", "555-0100")).unwrap();

        let duplicates = detect_duplicates(&store).unwrap();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].len(), 2);
    }

    #[test]
    fn each_contact_lands_in_one_duplicate_group_at_most() {
        let mut store = Store::open_in_memory().unwrap();
        save_contact(&mut store, &mut with_phone("Ada", "Lovelace", "555-0100")).unwrap();
        save_contact(&mut store, &mut named("ada", "Lovelace")).unwrap();
        save_contact(&mut store, &mut with_phone("Augusta", "Byron", "555-0100")).unwrap();

        let duplicates = detect_duplicates(&store).unwrap();

        // The two Lovelaces pair by name; the shared phone number cannot
        // form a second group out of the one remaining contact.
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].len(), 2);
        let total: usize = duplicates.iter().map(Vec::len).sum();
        assert_eq!(total, 2);
    }
}
