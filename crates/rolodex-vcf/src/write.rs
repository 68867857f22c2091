//! vCard 3.0 encoding.
//!
//! Emits one text block per contact with a fixed property order, so the
//! same contact always encodes to the same bytes (photo and `REV`
//! timestamp aside). Values carrying structure on the wire (`N`, `ADR`,
//! `NOTE`, `CATEGORIES`) are escaped; plain values such as `FN` and
//! phone numbers are written verbatim.

use std::io;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use tracing::debug;

use rolodex_core::model::{AddressType, Contact, EmailType, PhoneType};

use crate::escape::escape_text;
use crate::fold::fold_line;

/// Timestamp layout of the `REV` property (UTC).
const REV_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Resolves a contact's photo reference into image bytes for embedding.
///
/// The encoder treats the bytes as JPEG data and never inspects them.
pub trait PhotoSource {
    /// Loads the photo behind `uri` as JPEG-encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the reference cannot be read. The encoder
    /// logs the failure and omits the `PHOTO` property rather than
    /// aborting the export.
    fn load_jpeg(&self, uri: &str) -> io::Result<Vec<u8>>;
}

/// Encodes a single contact as one vCard 3.0 block, trailing newline
/// included.
///
/// Pass `None` for `photos` to skip photo embedding entirely.
#[must_use]
pub fn encode(contact: &Contact, photos: Option<&dyn PhotoSource>) -> String {
    encode_at(contact, photos, Utc::now())
}

/// Encodes many contacts, one blank line between blocks.
#[must_use]
pub fn encode_all(contacts: &[Contact], photos: Option<&dyn PhotoSource>) -> String {
    let now = Utc::now();
    let blocks: Vec<String> = contacts
        .iter()
        .map(|contact| encode_at(contact, photos, now))
        .collect();
    blocks.join("\n")
}

#[expect(clippy::too_many_lines)]
fn encode_at(contact: &Contact, photos: Option<&dyn PhotoSource>, now: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str("BEGIN:VCARD\n");
    out.push_str("VERSION:3.0\n");

    let name = format!(
        "{};{};{};{};{}",
        escape_text(&contact.last_name),
        escape_text(&contact.first_name),
        escape_text(contact.middle_name.as_deref().unwrap_or_default()),
        escape_text(contact.prefix.as_deref().unwrap_or_default()),
        escape_text(contact.suffix.as_deref().unwrap_or_default()),
    );
    push_property(&mut out, "N", &name);
    push_property(&mut out, "FN", &contact.display_name());

    if let Some(organization) = non_blank(contact.organization.as_deref()) {
        push_property(&mut out, "ORG", organization);
    }
    if let Some(title) = non_blank(contact.title.as_deref()) {
        push_property(&mut out, "TITLE", title);
    }

    for phone in &contact.phone_numbers {
        let token = match phone.kind {
            PhoneType::Mobile => "CELL",
            PhoneType::Home => "HOME",
            PhoneType::Work => "WORK",
            PhoneType::Fax => "FAX",
            PhoneType::Pager => "PAGER",
            PhoneType::Other | PhoneType::Custom => "VOICE",
        };
        let mut property = format!("TEL;TYPE={token}");
        if phone.kind == PhoneType::Custom {
            if let Some(label) = non_blank(phone.label.as_deref()) {
                property.push_str(&format!(";LABEL=\"{}\"", escape_text(label)));
            }
        }
        push_property(&mut out, &property, &phone.number);
    }

    for email in &contact.emails {
        let token = match email.kind {
            EmailType::Home => "HOME",
            EmailType::Work => "WORK",
            EmailType::Other | EmailType::Custom => "INTERNET",
        };
        let mut property = format!("EMAIL;TYPE={token}");
        if email.kind == EmailType::Custom {
            if let Some(label) = non_blank(email.label.as_deref()) {
                property.push_str(&format!(";LABEL=\"{}\"", escape_text(label)));
            }
        }
        push_property(&mut out, &property, &email.address);
    }

    for address in &contact.addresses {
        let token = match address.kind {
            AddressType::Home => "HOME",
            AddressType::Work => "WORK",
            AddressType::Other | AddressType::Custom => "OTHER",
        };
        let mut property = format!("ADR;TYPE={token}");
        if address.kind == AddressType::Custom {
            if let Some(label) = non_blank(address.label.as_deref()) {
                property.push_str(&format!(";LABEL=\"{}\"", escape_text(label)));
            }
        }
        // Post office box and extended address stay empty; the model
        // folds both into the street line.
        let value = format!(
            ";;{};{};{};{};{}",
            escape_text(&address.street),
            escape_text(&address.city),
            escape_text(&address.state),
            escape_text(&address.postal_code),
            escape_text(&address.country),
        );
        push_property(&mut out, &property, &value);
    }

    if let Some(notes) = non_blank(contact.notes.as_deref()) {
        push_property(&mut out, "NOTE", &escape_text(notes));
    }

    if !contact.groups.is_empty() {
        let names: Vec<String> = contact
            .groups
            .iter()
            .map(|group| escape_text(&group.name))
            .collect();
        push_property(&mut out, "CATEGORIES", &names.join(","));
    }

    if let (Some(source), Some(uri)) = (photos, contact.photo_uri.as_deref()) {
        match source.load_jpeg(uri) {
            Ok(bytes) => {
                push_property(
                    &mut out,
                    "PHOTO;ENCODING=BASE64;TYPE=JPEG",
                    &STANDARD.encode(&bytes),
                );
            }
            Err(error) => {
                debug!(%error, uri, "skipping unreadable photo");
            }
        }
    }

    push_property(&mut out, "REV", &now.format(REV_FORMAT).to_string());
    out.push_str("END:VCARD\n");

    out
}

/// Writes one property line, folded to the 75-character limit.
fn push_property(out: &mut String, name: &str, value: &str) {
    let line = format!("{name}:{value}");
    out.push_str(&fold_line(&line));
    out.push('\n');
}

/// Returns the value only when it is present and has visible content.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
