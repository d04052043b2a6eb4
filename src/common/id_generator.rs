// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXXXX (e.g., U_K7NP3X9QWE for users)
//!
//! This is the only identity type the store uses. Token subjects are
//! checked against it with [`is_valid_id`], never trial-parsed.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random characters after the prefix
pub const ID_LENGTH: usize = 10;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Brandbook (B_)
    Brandbook,
    /// Brandbook item (I_)
    Item,
    /// Uploaded file record (F_)
    File,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Brandbook => "B",
            EntityPrefix::Item => "I",
            EntityPrefix::File => "F",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Example
/// ```ignore
/// let user_id = generate_id(EntityPrefix::User);
/// // Returns something like "U_K7NP3X9QWE"
/// ```
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

/// Generate a raw Crockford Base32 string without prefix
/// Used for slug suffixes and OAuth state nonces
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

/// True when `value` has exactly the shape `generate_id(prefix)` produces
pub fn is_valid_id(prefix: EntityPrefix, value: &str) -> bool {
    value
        .strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .map_or(false, |body| {
            body.len() == ID_LENGTH && body.bytes().all(|b| CROCKFORD_ALPHABET.contains(&b))
        })
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a User ID (U_XXXXXXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Brandbook ID (B_XXXXXXXXXX)
pub fn generate_brandbook_id() -> String {
    generate_id(EntityPrefix::Brandbook)
}

/// Generate an Item ID (I_XXXXXXXXXX)
pub fn generate_item_id() -> String {
    generate_id(EntityPrefix::Item)
}

/// Generate a File ID (F_XXXXXXXXXX)
pub fn generate_file_id() -> String {
    generate_id(EntityPrefix::File)
}
