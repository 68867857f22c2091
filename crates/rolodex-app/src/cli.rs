//! Command-line surface of the `rolodex` binary.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use rolodex_core::config::Settings;
use rolodex_core::model::{Address, Contact};
use rolodex_db::Store;
use rolodex_service::{SyncOutcome, sync_groups};

use crate::snapshot::JsonSnapshotProvider;

#[derive(Debug, Parser)]
#[command(
    name = "rolodex",
    version,
    about = "Local contact book with vCard import/export"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List contacts in display order.
    List {
        /// Only favorites.
        #[arg(long)]
        favorites: bool,
    },
    /// Show every stored field of one contact.
    Show { id: i64 },
    /// Mark a contact as favorite, or clear the mark.
    Fav {
        id: i64,
        /// Clear the mark instead of setting it.
        #[arg(long)]
        remove: bool,
    },
    /// List groups with member counts.
    Groups,
    /// Import contacts from a vCard file.
    Import { file: PathBuf },
    /// Export contacts to a vCard file.
    Export {
        /// Output file. Defaults to a name in the configured export
        /// directory.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Export only these contact ids.
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,
        /// Embed photos read from each contact's photo path.
        #[arg(long)]
        photos: bool,
    },
    /// Reconcile system groups against a JSON snapshot file.
    Sync { snapshot: PathBuf },
    /// List likely duplicate contacts.
    Dupes,
}

/// Dispatches one parsed command against the open store.
///
/// ## Errors
/// Propagates store, service, and I/O failures to the caller.
pub fn run(command: Command, store: &mut Store, settings: &Settings) -> Result<()> {
    match command {
        Command::List { favorites } => list(store, favorites),
        Command::Show { id } => show(store, id),
        Command::Fav { id, remove } => fav(store, id, remove),
        Command::Groups => groups(store),
        Command::Import { file } => import(store, &file),
        Command::Export { out, ids, photos } => export(store, settings, out, &ids, photos),
        Command::Sync { snapshot } => sync(store, &snapshot),
        Command::Dupes => dupes(store),
    }
}

fn list(store: &Store, favorites: bool) -> Result<()> {
    let mut contacts = store.list_contacts()?;
    if favorites {
        contacts.retain(|contact| contact.is_favorite);
    }
    if contacts.is_empty() {
        println!("No contacts.");
        return Ok(());
    }
    for contact in &contacts {
        println!("{}", list_line(contact));
    }
    println!("{} contact(s)", contacts.len());
    Ok(())
}

fn show(store: &Store, id: i64) -> Result<()> {
    let contact = store.get_contact(id)?;
    let favorite = if contact.is_favorite { "  (favorite)" } else { "" };
    println!("{}{favorite}", contact.display_name());

    if let Some(nickname) = &contact.nickname {
        println!("  nickname:  {nickname}");
    }
    if let Some(organization) = &contact.organization {
        println!("  org:       {organization}");
    }
    if let Some(title) = &contact.title {
        println!("  title:     {title}");
    }
    for phone in &contact.phone_numbers {
        println!("  tel:       {} ({})", phone.number, phone.display_kind());
    }
    for email in &contact.emails {
        println!("  email:     {} ({})", email.address, email.display_kind());
    }
    for address in &contact.addresses {
        println!(
            "  adr:       {} ({})",
            format_address(address),
            address.display_kind()
        );
    }
    for website in &contact.websites {
        println!("  url:       {} ({})", website.url, website.kind.as_str());
    }
    for im in &contact.instant_messages {
        println!("  im:        {} ({})", im.handle, im.protocol.as_str());
    }
    if let Some(birthday) = &contact.birthday {
        println!("  birthday:  {birthday}");
    }
    for event in &contact.events {
        println!("  event:     {} ({})", event.date, event.kind.as_str());
    }
    if let Some(notes) = &contact.notes {
        println!("  notes:     {notes}");
    }
    if let Some(photo_uri) = &contact.photo_uri {
        println!("  photo:     {photo_uri}");
    }
    if let Some(ringtone) = &contact.ringtone {
        println!("  ringtone:  {ringtone}");
    }
    if !contact.groups.is_empty() {
        let names: Vec<&str> = contact
            .groups
            .iter()
            .map(|group| group.name.as_str())
            .collect();
        println!("  groups:    {}", names.join(", "));
    }
    println!("  updated:   {}", contact.updated_at.to_rfc3339());
    Ok(())
}

fn fav(store: &Store, id: i64, remove: bool) -> Result<()> {
    store.set_favorite(id, !remove)?;
    if remove {
        println!("Removed favorite mark from contact {id}");
    } else {
        println!("Marked contact {id} as favorite");
    }
    Ok(())
}

fn groups(store: &Store) -> Result<()> {
    let groups = store.list_groups()?;
    if groups.is_empty() {
        println!("No groups.");
        return Ok(());
    }
    for group in &groups {
        let id = group.id.unwrap_or_default();
        let origin = if group.is_system { "system" } else { "user" };
        println!(
            "{id:>5}  {} ({} members, {origin})",
            group.name, group.contact_count
        );
    }
    Ok(())
}

fn import(store: &mut Store, file: &Path) -> Result<()> {
    let imported = rolodex_service::import_contacts(store, file)?;
    println!("Imported {imported} contact(s) from {}", file.display());
    Ok(())
}

fn export(
    store: &Store,
    settings: &Settings,
    out: Option<PathBuf>,
    ids: &[i64],
    photos: bool,
) -> Result<()> {
    let selection = (!ids.is_empty()).then_some(ids);
    let contacts = rolodex_service::collect_for_export(store, selection)?;
    let path = out.unwrap_or_else(|| {
        PathBuf::from(&settings.export.directory).join(rolodex_service::default_file_name(
            &contacts,
            Utc::now().date_naive(),
        ))
    });
    rolodex_service::export_to_path(&contacts, &path, photos)?;
    println!("Exported {} contact(s) to {}", contacts.len(), path.display());
    Ok(())
}

fn sync(store: &mut Store, snapshot: &Path) -> Result<()> {
    let provider = JsonSnapshotProvider::new(snapshot);
    match sync_groups(store, &provider)? {
        SyncOutcome::Skipped { reason } => println!("Sync skipped: {reason}"),
        SyncOutcome::Applied {
            inserted,
            updated,
            deleted,
        } => {
            println!("Sync applied: {inserted} inserted, {updated} updated, {deleted} deleted");
        }
    }
    Ok(())
}

fn dupes(store: &Store) -> Result<()> {
    let clusters = rolodex_service::detect_duplicates(store)?;
    if clusters.is_empty() {
        println!("No duplicates found.");
        return Ok(());
    }
    for (index, cluster) in clusters.iter().enumerate() {
        println!("Group {}:", index + 1);
        for contact in cluster {
            println!("{}", list_line(contact));
        }
    }
    println!("{} duplicate group(s)", clusters.len());
    Ok(())
}

fn list_line(contact: &Contact) -> String {
    let id = contact.id.unwrap_or_default();
    let marker = if contact.is_favorite { '*' } else { ' ' };
    let mut line = format!("{id:>5} {marker} {}", contact.display_name());
    if let Some(phone) = contact.primary_phone() {
        line.push_str("  ");
        line.push_str(&phone.number);
    }
    line
}

fn format_address(address: &Address) -> String {
    [
        address.street.as_str(),
        address.city.as_str(),
        address.state.as_str(),
        address.postal_code.as_str(),
        address.country.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ")
}

#[cfg(test)]
mod tests {
    use rolodex_core::config::{DatabaseConfig, ExportConfig, LoggingConfig};

    use super::*;

    fn test_settings(export_dir: &Path) -> Settings {
        Settings {
            database: DatabaseConfig {
                path: ":memory:".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            export: ExportConfig {
                directory: export_dir.display().to_string(),
            },
        }
    }

    fn stored(store: &mut Store, first: &str, last: &str) -> i64 {
        let mut contact = Contact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Contact::new()
        };
        store.insert_contact(&mut contact).unwrap()
    }

    #[test]
    fn parses_export_flags() {
        let cli = Cli::try_parse_from(["rolodex", "export", "--ids", "1,2,3", "--photos"]).unwrap();
        match cli.command {
            Command::Export { out, ids, photos } => {
                assert!(out.is_none());
                assert_eq!(ids, vec![1, 2, 3]);
                assert!(photos);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_fav_remove() {
        let cli = Cli::try_parse_from(["rolodex", "fav", "7", "--remove"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Fav {
                id: 7,
                remove: true
            }
        ));
    }

    #[test]
    fn requires_a_subcommand() {
        assert!(Cli::try_parse_from(["rolodex"]).is_err());
    }

    #[test_log::test]
    fn export_command_writes_into_the_configured_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_in_memory().unwrap();
        stored(&mut store, "Ada", "Lovelace");

        run(
            Command::Export {
                out: None,
                ids: Vec::new(),
                photos: false,
            },
            &mut store,
            &test_settings(tmp.path()),
        )
        .unwrap();

        assert!(tmp.path().join("Ada Lovelace.vcf").exists());
    }

    #[test_log::test]
    fn sync_command_applies_a_snapshot_file() {
        let tmp = tempfile::tempdir().unwrap();
        let snapshot_path = tmp.path().join("snapshot.json");
        std::fs::write(
            &snapshot_path,
            r#"[{ "system_id": "g1", "title": "Coworkers", "contact_count": 0 }]"#,
        )
        .unwrap();

        let mut store = Store::open_in_memory().unwrap();
        run(
            Command::Sync {
                snapshot: snapshot_path,
            },
            &mut store,
            &test_settings(tmp.path()),
        )
        .unwrap();

        let groups = store.system_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Coworkers");
    }

    #[test]
    fn fav_command_round_trips_through_the_store() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = Store::open_in_memory().unwrap();
        let id = stored(&mut store, "Grace", "Hopper");

        run(
            Command::Fav { id, remove: false },
            &mut store,
            &test_settings(tmp.path()),
        )
        .unwrap();
        assert!(store.get_contact(id).unwrap().is_favorite);

        run(
            Command::Fav { id, remove: true },
            &mut store,
            &test_settings(tmp.path()),
        )
        .unwrap();
        assert!(!store.get_contact(id).unwrap().is_favorite);
    }
}
