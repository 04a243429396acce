use sha2::{Digest, Sha256};

/// Content hash identifying an ingested log, used for idempotent ingest.
pub fn content_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
