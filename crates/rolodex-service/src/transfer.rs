//! vCard import and export use cases.

use std::fs;
use std::io;
use std::path::Path;

use chrono::NaiveDate;

use rolodex_core::model::Contact;
use rolodex_db::{DbError, Store};
use rolodex_vcf::{PhotoSource, encode_all, parse};

use crate::contacts::resolve_groups;
use crate::error::{ServiceError, ServiceResult};

/// Resolves `photo_uri` values as filesystem paths holding JPEG bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPhotoSource;

impl PhotoSource for FsPhotoSource {
    fn load_jpeg(&self, uri: &str) -> io::Result<Vec<u8>> {
        fs::read(uri)
    }
}

/// ## Summary
/// Imports every parseable contact from a `.vcf` file, creating user
/// groups for category names on first use.
///
/// Per-contact persistence failures are logged and skipped; the import
/// fails only when nothing could be stored.
///
/// ## Errors
/// [`ServiceError::IoError`] when the file cannot be read,
/// [`ServiceError::ParseError`] when it is not vCard data at all, and
/// [`ServiceError::ImportFailed`] when zero contacts survive.
#[tracing::instrument(skip(store), fields(path = %path.display()))]
pub fn import_contacts(store: &mut Store, path: &Path) -> ServiceResult<usize> {
    let text = fs::read_to_string(path)?;
    let contacts = parse(&text)?;
    if contacts.is_empty() {
        return Err(ServiceError::ImportFailed(
            "no usable contacts in file".to_string(),
        ));
    }

    let total = contacts.len();
    let mut imported = 0;
    for mut contact in contacts {
        if let Err(err) = store_imported(store, &mut contact) {
            tracing::warn!(error = %err, name = %contact.display_name(), "skipping contact");
            continue;
        }
        imported += 1;
    }

    if imported == 0 {
        return Err(ServiceError::ImportFailed(
            "none of the contacts could be stored".to_string(),
        ));
    }
    tracing::info!(imported, total, "import finished");
    Ok(imported)
}

fn store_imported(store: &mut Store, contact: &mut Contact) -> ServiceResult<()> {
    resolve_groups(store, contact)?;
    store.insert_contact(contact)?;
    Ok(())
}

/// ## Summary
/// Exports contacts as a UTF-8 `.vcf` file and returns how many were
/// written. `ids: None` exports everything.
///
/// ## Errors
/// [`ServiceError::NotFound`] when nothing resolves,
/// [`ServiceError::IoError`] when the file cannot be written.
pub fn export_contacts(
    store: &Store,
    ids: Option<&[i64]>,
    path: &Path,
    include_photos: bool,
) -> ServiceResult<usize> {
    let contacts = collect_for_export(store, ids)?;
    export_to_path(&contacts, path, include_photos)?;
    Ok(contacts.len())
}

/// ## Summary
/// Loads the contacts an export covers: all of them, or the listed ids.
/// Missing ids are logged and skipped.
///
/// ## Errors
/// [`ServiceError::NotFound`] when nothing resolves.
pub fn collect_for_export(store: &Store, ids: Option<&[i64]>) -> ServiceResult<Vec<Contact>> {
    let contacts = match ids {
        None => store.list_contacts()?,
        Some(ids) => {
            let mut selected = Vec::with_capacity(ids.len());
            for &id in ids {
                match store.get_contact(id) {
                    Ok(contact) => selected.push(contact),
                    Err(DbError::ContactNotFound(_)) => {
                        tracing::warn!(id, "contact missing, not exported");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            selected
        }
    };
    if contacts.is_empty() {
        return Err(ServiceError::NotFound("no contacts to export".to_string()));
    }
    Ok(contacts)
}

/// ## Summary
/// Encodes the contacts and writes them to `path`, creating parent
/// directories as needed. Photo bytes are read from the filesystem only
/// when `include_photos` is set.
///
/// ## Errors
/// [`ServiceError::IoError`] when a directory or the file cannot be
/// written.
#[tracing::instrument(skip(contacts), fields(path = %path.display()))]
pub fn export_to_path(
    contacts: &[Contact],
    path: &Path,
    include_photos: bool,
) -> ServiceResult<()> {
    let photos = FsPhotoSource;
    let photo_source: &dyn PhotoSource = &photos;
    let text = encode_all(contacts, include_photos.then_some(photo_source));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    tracing::info!(count = contacts.len(), "exported contacts");
    Ok(())
}

/// The export file name: a single contact exports under its display name,
/// anything else under a dated bundle name.
#[must_use]
pub fn default_file_name(contacts: &[Contact], date: NaiveDate) -> String {
    match contacts {
        [only] => format!("{}.vcf", sanitize_file_stem(&only.display_name())),
        _ => format!("contacts_{}.vcf", date.format("%Y-%m-%d")),
    }
}

fn sanitize_file_stem(stem: &str) -> String {
    stem.chars()
        .map(|ch| {
            if matches!(ch, '/' | '\\' | ':' | '\0') {
                '_'
            } else {
                ch
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rolodex_core::model::{Group, PhoneNumber, PhoneType};

    use super::*;

    const TWO_CARDS: &str = "BEGIN:VCARD\n\
        VERSION:3.0\n\
        N:Lovelace;Ada;;;\n\
        FN:Ada Lovelace\n\
        TEL;TYPE=CELL:+44 20 7946 0000\n\
        CATEGORIES:Friends\n\
        END:VCARD\n\
        BEGIN:VCARD\n\
        VERSION:3.0\n\
        N:Hopper;Grace;;;\n\
        FN:Grace Hopper\n\
        EMAIL;TYPE=WORK:grace@example.org\n\
        END:VCARD\n";

    fn named(first: &str, last: &str) -> Contact {
        let mut contact = Contact::new();
        contact.first_name = first.to_string();
        contact.last_name = last.to_string();
        contact
    }

    #[test_log::test]
    fn import_stores_contacts_and_their_groups() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("two.vcf");
        fs::write(&path, TWO_CARDS).unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let imported = import_contacts(&mut store, &path).unwrap();

        assert_eq!(imported, 2);
        assert_eq!(store.count_contacts().unwrap(), 2);
        let friends = store.find_user_group("Friends").unwrap().unwrap();
        assert_eq!(friends.contact_count, 1);
    }

    #[test]
    fn import_missing_file_is_an_io_error() {
        let mut store = Store::open_in_memory().unwrap();
        let err = import_contacts(&mut store, Path::new("/nonexistent/contacts.vcf")).unwrap_err();
        assert!(matches!(err, ServiceError::IoError(_)));
    }

    #[test]
    fn import_rejects_non_vcard_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, "shopping list\nmilk\neggs\n").unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let err = import_contacts(&mut store, &path).unwrap_err();
        assert!(matches!(err, ServiceError::ParseError(_)));
    }

    #[test]
    fn import_with_no_usable_records_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.vcf");
        fs::write(&path, "BEGIN:VCARD\nVERSION:3.0\nORG:Acme\nEND:VCARD\n").unwrap();

        let mut store = Store::open_in_memory().unwrap();
        let err = import_contacts(&mut store, &path).unwrap_err();
        assert!(matches!(err, ServiceError::ImportFailed(_)));
    }

    #[test_log::test]
    fn export_round_trips_through_the_filesystem() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("two.vcf");
        fs::write(&source, TWO_CARDS).unwrap();

        let mut store = Store::open_in_memory().unwrap();
        import_contacts(&mut store, &source).unwrap();

        let out = tmp.path().join("exports").join("backup.vcf");
        let exported = export_contacts(&store, None, &out, false).unwrap();
        assert_eq!(exported, 2);

        let reparsed = parse(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed[0].display_name(), "Ada Lovelace");
        assert_eq!(reparsed[1].emails[0].address, "grace@example.org");
    }

    #[test]
    fn export_selected_skips_missing_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_in_memory().unwrap();
        let mut contact = named("Ada", "Lovelace");
        contact
            .phone_numbers
            .push(PhoneNumber::new("+44 20 7946 0000", PhoneType::Mobile));
        let id = store.insert_contact(&mut contact).unwrap();

        let out = tmp.path().join("one.vcf");
        let exported = export_contacts(&store, Some(&[id, 99]), &out, false).unwrap();
        assert_eq!(exported, 1);

        let err = export_contacts(&store, Some(&[99]), &out, false).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn export_of_an_empty_store_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory().unwrap();
        let err = export_contacts(&store, None, &tmp.path().join("none.vcf"), false).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn default_file_name_uses_display_name_for_single_export() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let single = vec![named("Ada", "Lovelace")];
        assert_eq!(default_file_name(&single, date), "Ada Lovelace.vcf");

        let awkward = vec![named("A/C", "Repair: Bob")];
        assert_eq!(default_file_name(&awkward, date), "A_C Repair_ Bob.vcf");

        let many = vec![named("Ada", "Lovelace"), named("Grace", "Hopper")];
        assert_eq!(default_file_name(&many, date), "contacts_2025-03-01.vcf");
    }

    #[test]
    fn unused_group_entries_do_not_leak_into_export() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_in_memory().unwrap();
        let mut contact = named("Ada", "Lovelace");
        contact.groups.push(Group::user("Friends"));
        store.insert_contact(&mut contact).unwrap();

        // The group was never persisted, so the stored contact has no
        // memberships and the export carries no CATEGORIES line.
        let out = tmp.path().join("ada.vcf");
        export_contacts(&store, None, &out, false).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert!(!text.contains("CATEGORIES"));
    }
}
