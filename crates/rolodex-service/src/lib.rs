//! Use cases built on top of the store: saving and de-duplicating
//! contacts, vCard import/export, and system group synchronization.
//!
//! Functions here validate input, compose store and codec calls, and log
//! what they did. Anything that touches more than one row runs inside
//! the store's transactions.

pub mod contacts;
pub mod error;
pub mod sync;
pub mod transfer;

pub use contacts::{delete_contacts, detect_duplicates, save_contact, save_group};
pub use error::{ServiceError, ServiceResult};
pub use sync::{SyncOutcome, SyncPlan, SystemGroupProvider, reconcile, sync_groups};
pub use transfer::{
    FsPhotoSource, collect_for_export, default_file_name, export_contacts, export_to_path,
    import_contacts,
};
