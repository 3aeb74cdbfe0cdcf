//! Key identifiers

use uuid::Uuid;

/// Prefix of every generated key ID.
pub const KEY_ID_PREFIX: &str = "d-key-";

/// Fresh random key ID, used verbatim as the JOSE `kid`.
///
/// The full 122 random bits of a v4 UUID are kept so collisions across the
/// lifetime of a deployment are negligible.
#[must_use]
pub fn generate_key_id() -> String {
    format!("{KEY_ID_PREFIX}{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_prefixed_and_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_key_id()).collect();
        assert_eq!(ids.len(), 1000);
        for id in &ids {
            assert!(id.starts_with(KEY_ID_PREFIX));
            assert_eq!(id.len(), KEY_ID_PREFIX.len() + 32);
        }
    }
}
