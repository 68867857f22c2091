//! SQLite persistence for contacts and groups.
//!
//! [`Store`] owns a single connection. Contact writes replace the contact's
//! child rows (phones, emails, addresses, websites, IM handles, events) and
//! group memberships wholesale inside one transaction, so a loaded [`Contact`]
//! always mirrors exactly what was last saved.

pub mod error;
pub mod schema;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, params};
use tracing::debug;

use rolodex_core::model::{
    Address, AddressType, Contact, Email, EmailType, Event, EventType, Group, ImProtocol,
    InstantMessage, PhoneNumber, PhoneType, Website, WebsiteType,
};

pub use error::{DbError, DbResult};

const CONTACT_COLUMNS: &str = "id, prefix, first_name, middle_name, last_name, suffix, nickname, \
     photo_uri, organization, title, notes, birthday, ringtone, is_favorite, created_at, updated_at";

const GROUP_COLUMNS: &str = "g.id, g.name, g.created_at, g.is_system, g.system_id, \
     g.account_name, g.account_type, \
     (SELECT COUNT(*) FROM contact_groups m WHERE m.group_id = g.id)";

/// SQLite-backed store for contacts and groups.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens or creates a store at the given path with WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::initialize(&conn)?;
        debug!(path = %path.display(), "opened contact store");
        Ok(Self { conn })
    }

    /// Opens an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or migrated.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    /// Inserts a contact together with its child rows and memberships.
    ///
    /// Stamps `created_at` and `updated_at` and writes the new row id back
    /// into the contact. Groups without an id are not linked.
    ///
    /// # Errors
    ///
    /// Returns an error when any statement in the transaction fails.
    pub fn insert_contact(&mut self, contact: &mut Contact) -> DbResult<i64> {
        let now = Utc::now();
        contact.created_at = now;
        contact.updated_at = now;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO contacts (prefix, first_name, middle_name, last_name, suffix, nickname,
             photo_uri, organization, title, notes, birthday, ringtone, is_favorite,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                contact.prefix,
                contact.first_name,
                contact.middle_name,
                contact.last_name,
                contact.suffix,
                contact.nickname,
                contact.photo_uri,
                contact.organization,
                contact.title,
                contact.notes,
                contact.birthday,
                contact.ringtone,
                contact.is_favorite,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_children(&tx, id, contact)?;
        write_memberships(&tx, id, &contact.groups)?;
        tx.commit()?;

        contact.id = Some(id);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`DbError::ContactNotFound`] when no row has the given id.
    pub fn get_contact(&self, id: i64) -> DbResult<Contact> {
        let mut contact = self
            .conn
            .query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                contact_from_row,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => DbError::ContactNotFound(id),
                other => DbError::DatabaseError(other),
            })?;
        self.load_children(id, &mut contact)?;
        Ok(contact)
    }

    /// Loads all contacts with their child rows, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error when a query fails.
    pub fn list_contacts(&self) -> DbResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             ORDER BY first_name COLLATE NOCASE, last_name COLLATE NOCASE"
        ))?;
        let mut contacts = stmt
            .query_map([], contact_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for contact in &mut contacts {
            if let Some(id) = contact.id {
                self.load_children(id, contact)?;
            }
        }
        Ok(contacts)
    }

    /// Rewrites a contact's row, child rows, and memberships.
    ///
    /// Stamps `updated_at`; `created_at` keeps its stored value.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingId`] when the contact was never saved and
    /// [`DbError::ContactNotFound`] when its row no longer exists.
    pub fn update_contact(&mut self, contact: &Contact) -> DbResult<()> {
        let id = contact.id.ok_or(DbError::MissingId)?;
        let tx = self.conn.transaction()?;
        let rows = tx.execute(
            "UPDATE contacts SET prefix = ?1, first_name = ?2, middle_name = ?3, last_name = ?4,
             suffix = ?5, nickname = ?6, photo_uri = ?7, organization = ?8, title = ?9,
             notes = ?10, birthday = ?11, ringtone = ?12, is_favorite = ?13, updated_at = ?14
             WHERE id = ?15",
            params![
                contact.prefix,
                contact.first_name,
                contact.middle_name,
                contact.last_name,
                contact.suffix,
                contact.nickname,
                contact.photo_uri,
                contact.organization,
                contact.title,
                contact.notes,
                contact.birthday,
                contact.ringtone,
                contact.is_favorite,
                Utc::now().to_rfc3339(),
                id,
            ],
        )?;
        if rows == 0 {
            return Err(DbError::ContactNotFound(id));
        }
        clear_children(&tx, id)?;
        write_children(&tx, id, contact)?;
        write_memberships(&tx, id, &contact.groups)?;
        tx.commit()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`DbError::ContactNotFound`] when no row has the given id.
    pub fn delete_contact(&self, id: i64) -> DbResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(DbError::ContactNotFound(id));
        }
        Ok(())
    }

    /// Deletes every listed contact in one transaction and returns how many
    /// rows actually existed. Ids with no row are skipped, not errors.
    ///
    /// # Errors
    ///
    /// Returns an error when a statement fails.
    pub fn delete_contacts(&mut self, ids: &[i64]) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        let mut removed = 0;
        for &id in ids {
            let rows = tx.execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
            if rows == 0 {
                debug!(id, "contact missing during batch delete");
            }
            removed += rows;
        }
        tx.commit()?;
        Ok(removed)
    }

    /// Flips the favorite flag, refreshing `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::ContactNotFound`] when no row has the given id.
    pub fn set_favorite(&self, id: i64, favorite: bool) -> DbResult<()> {
        let rows = self.conn.execute(
            "UPDATE contacts SET is_favorite = ?1, updated_at = ?2 WHERE id = ?3",
            params![favorite, Utc::now().to_rfc3339(), id],
        )?;
        if rows == 0 {
            return Err(DbError::ContactNotFound(id));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub fn count_contacts(&self) -> DbResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count)
    }

    // ========================================================================
    // Groups
    // ========================================================================

    /// Inserts a group and writes the new row id back into it.
    ///
    /// # Errors
    ///
    /// Returns an error when the insert fails.
    pub fn insert_group(&self, group: &mut Group) -> DbResult<i64> {
        self.conn.execute(
            "INSERT INTO groups (name, created_at, is_system, system_id, account_name, account_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                group.name,
                group.created_at.to_rfc3339(),
                group.is_system,
                group.system_id,
                group.account_name,
                group.account_type,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        group.id = Some(id);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`DbError::GroupNotFound`] when no row has the given id.
    pub fn get_group(&self, id: i64) -> DbResult<Group> {
        self.conn
            .query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM groups g WHERE g.id = ?1"),
                params![id],
                group_from_row,
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => DbError::GroupNotFound(id),
                other => DbError::DatabaseError(other),
            })
    }

    /// Lists every group with its member count, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub fn list_groups(&self) -> DbResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups g ORDER BY g.name COLLATE NOCASE"
        ))?;
        let groups = stmt
            .query_map([], group_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Lists only device-managed groups, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub fn system_groups(&self) -> DbResult<Vec<Group>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups g WHERE g.is_system = 1 ORDER BY g.name COLLATE NOCASE"
        ))?;
        let groups = stmt
            .query_map([], group_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(groups)
    }

    /// Finds a user-created group by name, ignoring case, so saving or
    /// importing "friends" reuses an existing "Friends" row.
    ///
    /// # Errors
    ///
    /// Returns an error when the query fails.
    pub fn find_user_group(&self, name: &str) -> DbResult<Option<Group>> {
        let result = self.conn.query_row(
            &format!(
                "SELECT {GROUP_COLUMNS} FROM groups g \
                 WHERE g.name = ?1 COLLATE NOCASE AND g.is_system = 0"
            ),
            params![name],
            group_from_row,
        );
        match result {
            Ok(group) => Ok(Some(group)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Renames a group and refreshes its account fields. `created_at` and
    /// `is_system` keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingId`] when the group was never saved and
    /// [`DbError::GroupNotFound`] when its row no longer exists.
    pub fn update_group(&self, group: &Group) -> DbResult<()> {
        let id = group.id.ok_or(DbError::MissingId)?;
        let rows = self.conn.execute(
            "UPDATE groups SET name = ?1, system_id = ?2, account_name = ?3, account_type = ?4
             WHERE id = ?5",
            params![
                group.name,
                group.system_id,
                group.account_name,
                group.account_type,
                id,
            ],
        )?;
        if rows == 0 {
            return Err(DbError::GroupNotFound(id));
        }
        Ok(())
    }

    /// Deletes a group; memberships cascade away with it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::GroupNotFound`] when no row has the given id.
    pub fn delete_group(&self, id: i64) -> DbResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM groups WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(DbError::GroupNotFound(id));
        }
        Ok(())
    }

    /// Adds a contact to a group; re-adding an existing membership is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when either referenced row does not exist.
    pub fn add_to_group(&self, contact_id: i64, group_id: i64) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO contact_groups (contact_id, group_id) VALUES (?1, ?2)",
            params![contact_id, group_id],
        )?;
        Ok(())
    }

    /// Removes a membership; removing an absent one is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error when the statement fails.
    pub fn remove_from_group(&self, contact_id: i64, group_id: i64) -> DbResult<()> {
        self.conn.execute(
            "DELETE FROM contact_groups WHERE contact_id = ?1 AND group_id = ?2",
            params![contact_id, group_id],
        )?;
        Ok(())
    }

    /// Loads the members of a group with their child rows, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error when a query fails.
    pub fn contacts_in_group(&self, group_id: i64) -> DbResult<Vec<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             JOIN contact_groups cg ON cg.contact_id = contacts.id
             WHERE cg.group_id = ?1
             ORDER BY first_name COLLATE NOCASE, last_name COLLATE NOCASE"
        ))?;
        let mut contacts = stmt
            .query_map(params![group_id], contact_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for contact in &mut contacts {
            if let Some(id) = contact.id {
                self.load_children(id, contact)?;
            }
        }
        Ok(contacts)
    }

    // ========================================================================
    // Sync
    // ========================================================================

    /// Applies a reconciliation plan in a single transaction: inserts are
    /// stored as device-managed groups, updates rewrite name and account
    /// fields, deletes remove rows (and cascade memberships). Nothing is
    /// committed when any step fails.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MissingId`] when an update entry has no id, or
    /// the first statement error encountered.
    pub fn sync_groups(
        &mut self,
        insert: &[Group],
        update: &[Group],
        delete: &[i64],
    ) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        for group in insert {
            tx.execute(
                "INSERT INTO groups (name, created_at, is_system, system_id, account_name, account_type)
                 VALUES (?1, ?2, 1, ?3, ?4, ?5)",
                params![
                    group.name,
                    group.created_at.to_rfc3339(),
                    group.system_id,
                    group.account_name,
                    group.account_type,
                ],
            )?;
        }
        for group in update {
            let id = group.id.ok_or(DbError::MissingId)?;
            tx.execute(
                "UPDATE groups SET name = ?1, system_id = ?2, account_name = ?3, account_type = ?4
                 WHERE id = ?5",
                params![
                    group.name,
                    group.system_id,
                    group.account_name,
                    group.account_type,
                    id,
                ],
            )?;
        }
        for &id in delete {
            tx.execute("DELETE FROM groups WHERE id = ?1", params![id])?;
        }
        tx.commit()?;
        debug!(
            inserted = insert.len(),
            updated = update.len(),
            deleted = delete.len(),
            "applied group sync plan"
        );
        Ok(())
    }

    fn load_children(&self, id: i64, contact: &mut Contact) -> DbResult<()> {
        let mut stmt = self.conn.prepare(
            "SELECT number, kind, label FROM phone_numbers WHERE contact_id = ?1 ORDER BY id",
        )?;
        contact.phone_numbers = stmt
            .query_map(params![id], |row| {
                Ok(PhoneNumber {
                    number: row.get(0)?,
                    kind: PhoneType::from_name(&row.get::<_, String>(1)?),
                    label: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT address, kind, label FROM emails WHERE contact_id = ?1 ORDER BY id")?;
        contact.emails = stmt
            .query_map(params![id], |row| {
                Ok(Email {
                    address: row.get(0)?,
                    kind: EmailType::from_name(&row.get::<_, String>(1)?),
                    label: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT street, city, state, postal_code, country, kind, label
             FROM addresses WHERE contact_id = ?1 ORDER BY id",
        )?;
        contact.addresses = stmt
            .query_map(params![id], |row| {
                Ok(Address {
                    street: row.get(0)?,
                    city: row.get(1)?,
                    state: row.get(2)?,
                    postal_code: row.get(3)?,
                    country: row.get(4)?,
                    kind: AddressType::from_name(&row.get::<_, String>(5)?),
                    label: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT url, kind FROM websites WHERE contact_id = ?1 ORDER BY id")?;
        contact.websites = stmt
            .query_map(params![id], |row| {
                Ok(Website {
                    url: row.get(0)?,
                    kind: WebsiteType::from_name(&row.get::<_, String>(1)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT handle, protocol FROM instant_messages WHERE contact_id = ?1 ORDER BY id",
        )?;
        contact.instant_messages = stmt
            .query_map(params![id], |row| {
                Ok(InstantMessage {
                    handle: row.get(0)?,
                    protocol: ImProtocol::from_name(&row.get::<_, String>(1)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self
            .conn
            .prepare("SELECT date, kind FROM events WHERE contact_id = ?1 ORDER BY id")?;
        contact.events = stmt
            .query_map(params![id], |row| {
                Ok(Event {
                    date: row.get(0)?,
                    kind: EventType::from_name(&row.get::<_, String>(1)?),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {GROUP_COLUMNS} FROM groups g
             JOIN contact_groups cg ON cg.group_id = g.id
             WHERE cg.contact_id = ?1 ORDER BY g.name COLLATE NOCASE"
        ))?;
        contact.groups = stmt
            .query_map(params![id], group_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(())
    }
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        prefix: row.get(1)?,
        first_name: row.get(2)?,
        middle_name: row.get(3)?,
        last_name: row.get(4)?,
        suffix: row.get(5)?,
        nickname: row.get(6)?,
        photo_uri: row.get(7)?,
        organization: row.get(8)?,
        title: row.get(9)?,
        notes: row.get(10)?,
        birthday: row.get(11)?,
        ringtone: row.get(12)?,
        is_favorite: row.get(13)?,
        created_at: parse_timestamp(&row.get::<_, String>(14)?),
        updated_at: parse_timestamp(&row.get::<_, String>(15)?),
        phone_numbers: Vec::new(),
        emails: Vec::new(),
        addresses: Vec::new(),
        websites: Vec::new(),
        instant_messages: Vec::new(),
        events: Vec::new(),
        groups: Vec::new(),
    })
}

fn group_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_timestamp(&row.get::<_, String>(2)?),
        is_system: row.get(3)?,
        system_id: row.get(4)?,
        account_name: row.get(5)?,
        account_type: row.get(6)?,
        contact_count: row.get(7)?,
    })
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|stamp| stamp.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn write_children(tx: &Transaction<'_>, contact_id: i64, contact: &Contact) -> DbResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO phone_numbers (contact_id, number, kind, label) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for phone in &contact.phone_numbers {
        stmt.execute(params![contact_id, phone.number, phone.kind.as_str(), phone.label])?;
    }

    let mut stmt =
        tx.prepare("INSERT INTO emails (contact_id, address, kind, label) VALUES (?1, ?2, ?3, ?4)")?;
    for email in &contact.emails {
        stmt.execute(params![contact_id, email.address, email.kind.as_str(), email.label])?;
    }

    let mut stmt = tx.prepare(
        "INSERT INTO addresses (contact_id, street, city, state, postal_code, country, kind, label)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for address in &contact.addresses {
        stmt.execute(params![
            contact_id,
            address.street,
            address.city,
            address.state,
            address.postal_code,
            address.country,
            address.kind.as_str(),
            address.label,
        ])?;
    }

    let mut stmt =
        tx.prepare("INSERT INTO websites (contact_id, url, kind) VALUES (?1, ?2, ?3)")?;
    for website in &contact.websites {
        stmt.execute(params![contact_id, website.url, website.kind.as_str()])?;
    }

    let mut stmt = tx
        .prepare("INSERT INTO instant_messages (contact_id, handle, protocol) VALUES (?1, ?2, ?3)")?;
    for im in &contact.instant_messages {
        stmt.execute(params![contact_id, im.handle, im.protocol.as_str()])?;
    }

    let mut stmt = tx.prepare("INSERT INTO events (contact_id, date, kind) VALUES (?1, ?2, ?3)")?;
    for event in &contact.events {
        stmt.execute(params![contact_id, event.date, event.kind.as_str()])?;
    }

    Ok(())
}

fn clear_children(tx: &Transaction<'_>, contact_id: i64) -> DbResult<()> {
    for table in [
        "phone_numbers",
        "emails",
        "addresses",
        "websites",
        "instant_messages",
        "events",
        "contact_groups",
    ] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE contact_id = ?1"),
            params![contact_id],
        )?;
    }
    Ok(())
}

/// Groups that were never saved have no row to reference and are skipped.
fn write_memberships(tx: &Transaction<'_>, contact_id: i64, groups: &[Group]) -> DbResult<()> {
    let mut stmt = tx.prepare(
        "INSERT OR IGNORE INTO contact_groups (contact_id, group_id) VALUES (?1, ?2)",
    )?;
    for group in groups {
        if let Some(group_id) = group.id {
            stmt.execute(params![contact_id, group_id])?;
        }
    }
    Ok(())
}
