//! Schema creation.

use rusqlite::Connection;

/// Creates every table and index the store uses, if missing.
///
/// # Errors
///
/// Returns an error when a DDL statement fails.
pub fn initialize(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            prefix TEXT,
            first_name TEXT NOT NULL DEFAULT '',
            middle_name TEXT,
            last_name TEXT NOT NULL DEFAULT '',
            suffix TEXT,
            nickname TEXT,
            photo_uri TEXT,
            organization TEXT,
            title TEXT,
            notes TEXT,
            birthday TEXT,
            ringtone TEXT,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS phone_numbers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            number TEXT NOT NULL,
            kind TEXT NOT NULL,
            label TEXT
        );

        CREATE TABLE IF NOT EXISTS emails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            address TEXT NOT NULL,
            kind TEXT NOT NULL,
            label TEXT
        );

        CREATE TABLE IF NOT EXISTS addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            street TEXT NOT NULL DEFAULT '',
            city TEXT NOT NULL DEFAULT '',
            state TEXT NOT NULL DEFAULT '',
            postal_code TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL,
            label TEXT
        );

        CREATE TABLE IF NOT EXISTS websites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            url TEXT NOT NULL,
            kind TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS instant_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            handle TEXT NOT NULL,
            protocol TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            kind TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            is_system INTEGER NOT NULL DEFAULT 0,
            system_id TEXT,
            account_name TEXT,
            account_type TEXT
        );

        CREATE TABLE IF NOT EXISTS contact_groups (
            contact_id INTEGER NOT NULL REFERENCES contacts(id) ON DELETE CASCADE,
            group_id INTEGER NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
            PRIMARY KEY (contact_id, group_id)
        );

        CREATE INDEX IF NOT EXISTS idx_phone_numbers_contact ON phone_numbers(contact_id);
        CREATE INDEX IF NOT EXISTS idx_emails_contact ON emails(contact_id);
        CREATE INDEX IF NOT EXISTS idx_addresses_contact ON addresses(contact_id);
        CREATE INDEX IF NOT EXISTS idx_websites_contact ON websites(contact_id);
        CREATE INDEX IF NOT EXISTS idx_instant_messages_contact ON instant_messages(contact_id);
        CREATE INDEX IF NOT EXISTS idx_events_contact ON events(contact_id);
        CREATE INDEX IF NOT EXISTS idx_groups_system_id ON groups(system_id);
        CREATE INDEX IF NOT EXISTS idx_contact_groups_group ON contact_groups(group_id);",
    )
}
