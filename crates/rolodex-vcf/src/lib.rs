//! vCard 3.0 encoding and decoding (RFC 2426 subset).
//!
//! This crate covers the property catalog the rest of the workspace
//! exchanges with other contact tools: `N`, `FN`, `ORG`, `TITLE`, `TEL`,
//! `EMAIL`, `ADR`, `NOTE`, `CATEGORIES`, `PHOTO`, and `REV`.
//!
//! ## Encoding
//!
//! ```rust
//! use rolodex_core::model::Contact;
//! use rolodex_vcf::encode;
//!
//! let mut contact = Contact::new();
//! contact.first_name = "Jane".to_string();
//! contact.last_name = "Doe".to_string();
//!
//! let block = encode(&contact, None);
//! assert!(block.contains("FN:Jane Doe"));
//! ```
//!
//! ## Decoding
//!
//! ```rust
//! use rolodex_vcf::parse;
//!
//! let input = "\
//! BEGIN:VCARD\n\
//! VERSION:3.0\n\
//! N:Doe;Jane;;;\n\
//! FN:Jane Doe\n\
//! END:VCARD\n";
//!
//! let contacts = parse(input).unwrap();
//! assert_eq!(contacts[0].display_name(), "Jane Doe");
//! ```
//!
//! ## Round-Trip Fidelity
//!
//! Values are escaped on the way out and unescaped on the way in with
//! matching rules, and folded lines are reassembled before any value
//! handling, so encode-then-parse preserves every field the format
//! carries.

pub mod error;
pub mod escape;
pub mod fold;
pub mod parse;
pub mod write;

#[cfg(test)]
mod tests;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parse::parse;
pub use write::{PhotoSource, encode, encode_all};
