/// Well-known group names shared across crates.
///
/// Older contact sources expose the favorites group under this legacy
/// name; the sync layer renames it on the fly.
pub const LEGACY_STARRED_GROUP: &str = "Starred in Android";

/// Canonical name of the favorites system group.
pub const FAVORITES_GROUP: &str = "Favorites";

/// Placeholder shown for contacts without any usable name.
pub const UNNAMED_CONTACT: &str = "Unnamed Contact";
