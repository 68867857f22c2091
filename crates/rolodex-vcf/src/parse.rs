//! vCard 3.0 decoding.
//!
//! The parser is deliberately forgiving: it unfolds continuation lines,
//! accepts both `TYPE=` parameters and bare vCard 2.1 style tokens, and
//! skips anything it cannot make sense of rather than rejecting the whole
//! input. A record must carry at least a name or a phone number to be
//! kept.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

use rolodex_core::model::{
    Address, AddressType, Contact, Email, EmailType, Group, PhoneNumber, PhoneType,
};

use crate::error::{ParseError, ParseErrorKind, ParseResult};
use crate::escape::unescape_text;

/// Parameter tokens recognized on `TEL`, first match wins. Checked twice:
/// once against bare tokens, once against `TYPE=` values.
const PHONE_TOKENS: [(&str, PhoneType); 7] = [
    ("CELL", PhoneType::Mobile),
    ("MOBILE", PhoneType::Mobile),
    ("HOME", PhoneType::Home),
    ("WORK", PhoneType::Work),
    ("FAX", PhoneType::Fax),
    ("PAGER", PhoneType::Pager),
    ("VOICE", PhoneType::Other),
];

const EMAIL_TOKENS: [(&str, EmailType); 3] = [
    ("HOME", EmailType::Home),
    ("WORK", EmailType::Work),
    ("INTERNET", EmailType::Other),
];

const ADDRESS_TOKENS: [(&str, AddressType); 3] = [
    ("HOME", AddressType::Home),
    ("WORK", AddressType::Work),
    ("OTHER", AddressType::Other),
];

/// Parses vCard text into contacts.
///
/// Malformed lines and records missing both a name and a phone number are
/// logged and skipped, so a partially damaged file still yields whatever
/// can be recovered.
///
/// # Errors
///
/// Returns an error when the input contains no `BEGIN:VCARD` marker at
/// all, which distinguishes "not vCard data" from "vCard data with zero
/// usable records".
pub fn parse(input: &str) -> ParseResult<Vec<Contact>> {
    let lines = logical_lines(input);
    let mut contacts = Vec::new();
    let mut builder: Option<RecordBuilder> = None;
    let mut saw_record = false;

    for (idx, line) in lines.iter().enumerate() {
        let line_num = idx + 1;

        if starts_with_ignore_case(line, "BEGIN:VCARD") {
            saw_record = true;
            builder = Some(RecordBuilder::default());
            continue;
        }
        if starts_with_ignore_case(line, "END:VCARD") {
            if let Some(finished) = builder.take() {
                match finished.build() {
                    Some(contact) => contacts.push(contact),
                    None => debug!(line = line_num, "skipping record without name or phone"),
                }
            }
            continue;
        }

        let Some(current) = builder.as_mut() else {
            // Content outside BEGIN/END carries nothing we can attach.
            continue;
        };
        match parse_content_line(line, line_num) {
            Ok(content) => current.apply(&content),
            Err(error) => warn!(%error, "skipping malformed line"),
        }
    }

    if !saw_record {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedEof,
            1,
            "no BEGIN:VCARD record found",
        ));
    }

    Ok(contacts)
}

/// Merges folded physical lines into logical lines and drops blanks.
///
/// A continuation line starts with a single space or tab; the marker is
/// removed and the rest appended to the previous line.
fn logical_lines(input: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for raw in input.lines() {
        if raw.is_empty() {
            continue;
        }
        if let Some(rest) = raw.strip_prefix([' ', '\t']) {
            if let Some(previous) = lines.last_mut() {
                previous.push_str(rest);
            }
            continue;
        }
        lines.push(raw.to_string());
    }

    lines
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// One unfolded `NAME;PARAMS:VALUE` line.
#[derive(Debug)]
struct ContentLine {
    name: String,
    params: Params,
    value: String,
}

/// Property parameters, keys uppercased. Bare vCard 2.1 tokens are kept
/// as keys with an empty value.
#[derive(Debug, Default)]
struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, value)| value.as_str())
    }

    fn has_flag(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.as_str() == key)
    }

    fn type_contains(&self, token: &str) -> bool {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() == "TYPE")
            .any(|(_, value)| {
                value
                    .to_ascii_uppercase()
                    .split(',')
                    .any(|part| part.trim() == token)
            })
    }
}

fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let colon = find_value_separator(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            format!("missing ':' separator in {line:?}"),
        )
    })?;
    let (head, rest) = line.split_at(colon);
    let value = &rest[1..];

    let (name, param_segment) = match head.find(';') {
        Some(idx) => (&head[..idx], Some(&head[idx + 1..])),
        None => (head, None),
    };
    if name.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            "empty property name",
        ));
    }

    let mut params = Params::default();
    if let Some(segment) = param_segment {
        for part in split_quote_aware(segment, ';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.split_once('=') {
                Some((key, value)) => params.entries.push((
                    key.trim().to_ascii_uppercase(),
                    value.trim().trim_matches('"').to_string(),
                )),
                None => params.entries.push((part.to_ascii_uppercase(), String::new())),
            }
        }
    }

    Ok(ContentLine {
        name: name.trim().to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Finds the byte offset of the first `:` outside double quotes, so
/// quoted parameter values may contain colons.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Splits on `separator` outside double quotes.
fn split_quote_aware(segment: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (idx, c) in segment.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            parts.push(&segment[start..idx]);
            start = idx + separator.len_utf8();
        }
    }
    parts.push(&segment[start..]);

    parts
}

/// Splits a value on unescaped occurrences of `separator`, keeping
/// backslash escape pairs intact for later unescaping.
fn split_on_unescaped(value: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == separator {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    parts
}

/// Returns the component at `idx`, unescaped and trimmed.
fn component(parts: &[String], idx: usize) -> String {
    parts
        .get(idx)
        .map(|part| unescape_text(part).trim().to_string())
        .unwrap_or_default()
}

/// Resolves a kind token from parameters: bare tokens first, `TYPE=`
/// values second, `fallback` when nothing matches.
fn resolve_kind<T: Copy>(params: &Params, tokens: &[(&str, T)], fallback: T) -> T {
    for (token, kind) in tokens {
        if params.has_flag(token) {
            return *kind;
        }
    }
    for (token, kind) in tokens {
        if params.type_contains(token) {
            return *kind;
        }
    }
    fallback
}

/// A `LABEL` parameter with visible content marks the property as
/// custom-typed.
fn custom_label(params: &Params) -> Option<String> {
    params
        .get("LABEL")
        .map(unescape_text)
        .filter(|label| !label.trim().is_empty())
}

/// Accumulates properties for one record between BEGIN and END.
#[derive(Debug, Default)]
struct RecordBuilder {
    first_name: String,
    last_name: String,
    middle_name: String,
    prefix: String,
    suffix: String,
    organization: String,
    title: String,
    notes: String,
    photo_uri: Option<String>,
    phone_numbers: Vec<PhoneNumber>,
    emails: Vec<Email>,
    addresses: Vec<Address>,
    groups: Vec<Group>,
}

impl RecordBuilder {
    fn apply(&mut self, line: &ContentLine) {
        if line.value.trim().is_empty() {
            return;
        }

        match line.name.as_str() {
            "N" => self.structured_name(&line.value),
            "FN" => self.formatted_name(&line.value),
            "ORG" => self.organization = component(&split_on_unescaped(&line.value, ';'), 0),
            "TITLE" => self.title = unescape_text(&line.value),
            "NOTE" => self.notes = unescape_text(&line.value),
            "TEL" => self.telephone(line),
            "EMAIL" => self.email(line),
            "ADR" => self.address(line),
            "PHOTO" => self.photo(line),
            "CATEGORIES" => self.categories(&line.value),
            _ => {}
        }
    }

    fn structured_name(&mut self, value: &str) {
        let parts = split_on_unescaped(value, ';');
        self.last_name = component(&parts, 0);
        self.first_name = component(&parts, 1);
        self.middle_name = component(&parts, 2);
        self.prefix = component(&parts, 3);
        self.suffix = component(&parts, 4);
    }

    /// Derives names from `FN` only when no `N` property supplied any.
    /// Middle words are dropped; only the first and last survive.
    fn formatted_name(&mut self, value: &str) {
        if !self.first_name.is_empty() || !self.last_name.is_empty() {
            return;
        }

        let full = unescape_text(value);
        let words: Vec<&str> = full.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            [only] => self.first_name = (*only).to_string(),
            [first, .., last] => {
                self.first_name = (*first).to_string();
                self.last_name = (*last).to_string();
            }
        }
    }

    fn telephone(&mut self, line: &ContentLine) {
        let label = custom_label(&line.params);
        let kind = if label.is_some() {
            PhoneType::Custom
        } else {
            resolve_kind(&line.params, &PHONE_TOKENS, PhoneType::Mobile)
        };
        self.phone_numbers.push(PhoneNumber {
            number: unescape_text(&line.value).trim().to_string(),
            kind,
            label,
        });
    }

    fn email(&mut self, line: &ContentLine) {
        let label = custom_label(&line.params);
        let kind = if label.is_some() {
            EmailType::Custom
        } else {
            resolve_kind(&line.params, &EMAIL_TOKENS, EmailType::Home)
        };
        self.emails.push(Email {
            address: unescape_text(&line.value).trim().to_string(),
            kind,
            label,
        });
    }

    /// The first three address components (post office box, extended
    /// address, street) merge into the street line.
    fn address(&mut self, line: &ContentLine) {
        let parts = split_on_unescaped(&line.value, ';');

        let mut street_parts = Vec::new();
        for idx in 0..3 {
            let part = component(&parts, idx);
            if !part.is_empty() {
                street_parts.push(part);
            }
        }

        let label = custom_label(&line.params);
        let kind = if label.is_some() {
            AddressType::Custom
        } else {
            resolve_kind(&line.params, &ADDRESS_TOKENS, AddressType::Home)
        };

        self.addresses.push(Address {
            street: street_parts.join(", "),
            city: component(&parts, 3),
            state: component(&parts, 4),
            postal_code: component(&parts, 5),
            country: component(&parts, 6),
            kind,
            label,
        });
    }

    /// Inline payloads are validated and dropped; the model only carries
    /// photo references. Anything not base64-encoded is kept as a URI.
    fn photo(&mut self, line: &ContentLine) {
        let encoding = line.params.get("ENCODING").map(str::to_ascii_uppercase);
        if matches!(encoding.as_deref(), Some("BASE64" | "B")) {
            let compact: String = line
                .value
                .chars()
                .filter(|c| !matches!(c, '\n' | '\r' | ' '))
                .collect();
            match STANDARD.decode(&compact) {
                Ok(bytes) => debug!(bytes = bytes.len(), "discarding inline photo payload"),
                Err(error) => debug!(%error, "ignoring undecodable inline photo"),
            }
            return;
        }
        self.photo_uri = Some(line.value.trim().to_string());
    }

    fn categories(&mut self, value: &str) {
        for part in split_on_unescaped(value, ',') {
            let name = unescape_text(&part).trim().to_string();
            if !name.is_empty() {
                self.groups.push(Group::user(name));
            }
        }
    }

    fn build(self) -> Option<Contact> {
        if self.first_name.is_empty() && self.last_name.is_empty() && self.phone_numbers.is_empty()
        {
            return None;
        }

        Some(Contact {
            first_name: self.first_name,
            last_name: self.last_name,
            middle_name: opt(self.middle_name),
            prefix: opt(self.prefix),
            suffix: opt(self.suffix),
            organization: opt(self.organization),
            title: opt(self.title),
            notes: opt(self.notes),
            photo_uri: self.photo_uri,
            phone_numbers: self.phone_numbers,
            emails: self.emails,
            addresses: self.addresses,
            groups: self.groups,
            ..Contact::new()
        })
    }
}

fn opt(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
