//! Module identity hashes.

use sha2::{Digest, Sha256};

/// Hash identifying a module by name: the first eight bytes of the
/// SHA-256 digest of `name`, read little endian.
///
/// # Examples
///
/// ```
/// use bytecode_system::module_hash;
///
/// assert_eq!(module_hash("main"), module_hash("main"));
/// assert_ne!(module_hash("main"), module_hash("util"));
/// ```
pub fn module_hash(name: &str) -> u64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(prefix)
}
