//! Round-trip encoding and decoding tests.
//!
//! Encoding a contact and parsing the result back must preserve every
//! field the format carries.

use rolodex_core::model::{
    Address, AddressType, Contact, Email, EmailType, Group, PhoneNumber, PhoneType,
};

use crate::{encode, encode_all, parse};

fn rich_contact() -> Contact {
    let mut contact = Contact::new();
    contact.first_name = "Jane".to_string();
    contact.last_name = "Doe".to_string();
    contact.middle_name = Some("Q".to_string());
    contact.prefix = Some("Dr.".to_string());
    contact.suffix = Some("III".to_string());
    contact.organization = Some("Acme".to_string());
    contact.title = Some("Engineer".to_string());
    contact.notes = Some("Met at conf, discussed: project X".to_string());
    contact.phone_numbers = vec![
        PhoneNumber::new("+15550100", PhoneType::Mobile),
        PhoneNumber {
            number: "+15550101".to_string(),
            kind: PhoneType::Custom,
            label: Some("Satellite".to_string()),
        },
    ];
    contact.emails = vec![Email::new("jane@acme.test", EmailType::Work)];
    contact.addresses = vec![Address {
        street: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        postal_code: "62704".to_string(),
        country: "USA".to_string(),
        kind: AddressType::Work,
        label: None,
    }];
    contact.groups = vec![Group::user("Friends, Close"), Group::user("Work")];
    contact
}

#[test]
fn round_trip_preserves_fields() {
    let original = rich_contact();
    let decoded_all = parse(&encode(&original, None)).unwrap();
    let decoded = &decoded_all[0];

    assert_eq!(decoded.first_name, original.first_name);
    assert_eq!(decoded.last_name, original.last_name);
    assert_eq!(decoded.middle_name, original.middle_name);
    assert_eq!(decoded.prefix, original.prefix);
    assert_eq!(decoded.suffix, original.suffix);
    assert_eq!(decoded.organization, original.organization);
    assert_eq!(decoded.title, original.title);
    assert_eq!(decoded.notes, original.notes);

    assert_eq!(decoded.phone_numbers.len(), 2);
    assert_eq!(decoded.phone_numbers[0].number, "+15550100");
    assert_eq!(decoded.phone_numbers[0].kind, PhoneType::Mobile);
    assert_eq!(decoded.phone_numbers[1].kind, PhoneType::Custom);
    assert_eq!(decoded.phone_numbers[1].label.as_deref(), Some("Satellite"));

    assert_eq!(decoded.emails[0].address, "jane@acme.test");
    assert_eq!(decoded.emails[0].kind, EmailType::Work);

    let address = &decoded.addresses[0];
    assert_eq!(address.street, "1 Main St");
    assert_eq!(address.city, "Springfield");
    assert_eq!(address.state, "IL");
    assert_eq!(address.postal_code, "62704");
    assert_eq!(address.country, "USA");
    assert_eq!(address.kind, AddressType::Work);

    let groups: Vec<&str> = decoded.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(groups, vec!["Friends, Close", "Work"]);
}

#[test]
fn round_trip_survives_folding() {
    let mut contact = Contact::new();
    contact.first_name = "Jane".to_string();
    contact.notes = Some("word ".repeat(50).trim_end().to_string());

    let encoded = encode(&contact, None);
    assert!(encoded.contains("\n "));

    let decoded = parse(&encoded).unwrap();
    assert_eq!(decoded[0].notes, contact.notes);
}

#[test]
fn round_trip_escaped_name_components() {
    let mut contact = Contact::new();
    contact.first_name = "Ann;Marie".to_string();
    contact.last_name = "O'Lea:ry".to_string();

    let decoded = parse(&encode(&contact, None)).unwrap();
    assert_eq!(decoded[0].first_name, "Ann;Marie");
    assert_eq!(decoded[0].last_name, "O'Lea:ry");
}

#[test]
fn multi_contact_export_reimports() {
    let mut first = Contact::new();
    first.first_name = "Jane".to_string();
    let mut second = Contact::new();
    second.first_name = "John".to_string();

    let decoded = parse(&encode_all(&[first, second], None)).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].first_name, "Jane");
    assert_eq!(decoded[1].first_name, "John");
}
