//! Storage-key derivation for principal names.

use sha1::{Digest, Sha1};

/// Length in characters of a hashed fallback key.
///
/// Backends whose key limit is below this cannot hold the fallback key
/// either; the cache builder rejects them up front so key size never
/// becomes an operation-time error.
pub const HASHED_KEY_LEN: usize = 40;

/// Derives the storage key for a principal name.
///
/// Names that fit within the backend's key limit are used verbatim, which
/// keeps short keys readable when inspecting the store. Longer names are
/// replaced by their unsalted SHA-1 hex digest ([`HASHED_KEY_LEN`]
/// characters).
///
/// The unsalted digest is a length workaround, not a security measure,
/// and must stay as-is: existing deployments have records keyed by it,
/// and salting would orphan them.
#[must_use]
pub fn derive_storage_key(principal: &str, max_key_size: usize) -> String {
    if principal.len() <= max_key_size {
        principal.to_string()
    } else {
        hex::encode(Sha1::digest(principal.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_used_verbatim() {
        assert_eq!(derive_storage_key("jdoe", 255), "jdoe");
    }

    #[test]
    fn name_at_limit_is_used_verbatim() {
        let name = "a".repeat(40);
        assert_eq!(derive_storage_key(&name, 40), name);
    }

    #[test]
    fn long_name_is_hashed_to_hex_digest() {
        let name = "b".repeat(41);
        let key = derive_storage_key(&name, 40);

        assert_eq!(key.len(), HASHED_KEY_LEN);
        assert_ne!(key, name);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hashing_is_deterministic() {
        let name = "c".repeat(100);
        assert_eq!(derive_storage_key(&name, 10), derive_storage_key(&name, 10));
    }

    #[test]
    fn distinct_long_names_do_not_collide() {
        let names: Vec<String> = (0..50)
            .map(|n| format!("user-{n}@very-long-domain.example.org").repeat(4))
            .collect();

        let mut keys: Vec<String> = names.iter().map(|n| derive_storage_key(n, 16)).collect();
        keys.sort();
        keys.dedup();

        assert_eq!(keys.len(), names.len());
    }

    #[test]
    fn known_digest() {
        // SHA-1("abc") from FIPS 180-1.
        let key = derive_storage_key("abc", 2);
        assert_eq!(key, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }
}
