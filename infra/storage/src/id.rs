//! Document identifiers.
//!
//! An id is twelve bytes rendered as 24 lowercase hex characters: four bytes of big-endian
//! unix seconds, five random bytes drawn once per generator, and a three-byte counter that
//! starts at a random offset. Ids from one generator are unique and roughly time ordered.

use crate::error::StorageError;
use docket_kernel::domain::constants::DOCUMENT_ID_LEN;
use getrandom::fill;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const COUNTER_MASK: u32 = 0x00ff_ffff;

#[derive(Debug)]
pub(crate) struct IdGenerator {
    process: [u8; 5],
    counter: AtomicU32,
}

impl IdGenerator {
    pub(crate) fn new() -> Result<Self, StorageError> {
        let mut seed = [0u8; 9];
        fill(&mut seed).map_err(|e| StorageError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to seed document id generator".into()),
        })?;

        let mut process = [0u8; 5];
        process.copy_from_slice(&seed[..5]);
        let start = u32::from_be_bytes([seed[5], seed[6], seed[7], seed[8]]) & COUNTER_MASK;

        Ok(Self { process, counter: AtomicU32::new(start) })
    }

    pub(crate) fn next_id(&self) -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX));
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut raw = [0u8; 12];
        raw[..4].copy_from_slice(&secs.to_be_bytes());
        raw[4..9].copy_from_slice(&self.process);
        raw[9..].copy_from_slice(&count.to_be_bytes()[1..]);

        hex::encode(raw)
    }
}

/// Whether `id` has the shape of a generated document id.
pub(crate) fn is_valid(id: &str) -> bool {
    id.len() == DOCUMENT_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_24_lowercase_hex() {
        let generator = IdGenerator::new().unwrap();
        let id = generator.next_id();
        assert_eq!(id.len(), DOCUMENT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert!(is_valid(&id));
    }

    #[test]
    fn ids_do_not_repeat() {
        let generator = IdGenerator::new().unwrap();
        let ids: HashSet<String> = (0..1000).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn ids_share_the_process_segment() {
        let generator = IdGenerator::new().unwrap();
        let (a, b) = (generator.next_id(), generator.next_id());
        assert_eq!(a[8..18], b[8..18]);
    }

    #[test]
    fn shape_check() {
        assert!(is_valid("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(is_valid("65A1F0C2E4B0A1B2C3D4E5F6"));
        assert!(!is_valid("65a1f0c2e4b0a1b2c3d4e5f"));
        assert!(!is_valid("65a1f0c2e4b0a1b2c3d4e5fz"));
        assert!(!is_valid("../../../../etc/passwd.."));
        assert!(!is_valid(""));
    }
}
