use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Normalize a title for identity purposes: trimmed, lowercased,
/// inner whitespace collapsed to single spaces.
pub fn normalize_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dedup identity key: `{source_id}_{hash8}_{YYYYMMDD}`.
///
/// The date bucket means the same opportunity rediscovered within a day is a
/// silent no-op, while a long-lived listing resurfaces in later buckets.
pub fn identity_key(source_id: &str, title: &str, found_at: DateTime<Utc>) -> String {
    let normalized = normalize_title(title);
    let mut hasher = Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update(b"|");
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();
    let hash8: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("{}_{}_{}", source_id, hash8, found_at.format("%Y%m%d"))
}
