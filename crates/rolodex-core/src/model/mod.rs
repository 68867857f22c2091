//! Domain model shared by every layer.

mod contact;
mod fields;
mod group;

pub use contact::Contact;
pub use fields::{
    Address, AddressType, Email, EmailType, Event, EventType, ImProtocol, InstantMessage,
    PhoneNumber, PhoneType, Website, WebsiteType,
};
pub use group::{Group, SystemGroup};
