//! Content fingerprints used as read-tracking identities.
//!
//! The identity is `{date}:{cohort}:{hash}` over ten newline-joined slots:
//! title, the three sections, category, priority, then the raw legacy
//! `keyChange`, `previousContent`, `currentContent` and `body` fields (empty for
//! structured content). Same text yields the same id; any edit yields a new
//! one, which resets read state for corrected posts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::content::ContentRecord;

/// Hash used for the fingerprint suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    /// 64 bits of SHA-256, hex.
    #[default]
    Wide,
    /// 32-bit djb2 xor variant, base-36. Reproduces ids written by the web
    /// reader, so its stored read flags keep matching.
    Djb2,
}

/// Compute the content identity for a record at (date, cohort).
pub fn fingerprint(date: &str, cohort: &str, content: &ContentRecord, algorithm: FingerprintAlgorithm) -> String {
    let payload = fingerprint_payload(content);
    let hash = match algorithm {
        FingerprintAlgorithm::Wide => wide_hex(&payload),
        FingerprintAlgorithm::Djb2 => djb2_base36(&payload),
    };
    format!("{date}:{cohort}:{hash}")
}

fn fingerprint_payload(content: &ContentRecord) -> String {
    let legacy = &content.legacy;
    [
        content.title.as_deref(),
        Some(content.sections.past.as_str()),
        Some(content.sections.change.as_str()),
        Some(content.sections.detail.as_str()),
        content.category.as_deref(),
        content.priority.as_deref(),
        legacy.key_change.as_deref(),
        legacy.previous_content.as_deref(),
        legacy.current_content.as_deref(),
        legacy.body.as_deref(),
    ]
    .map(|slot| slot.unwrap_or(""))
    .join("\n")
}

/// `h = h * 33 ^ unit` over UTF-16 code units, 32-bit wrapping.
pub fn djb2_base36(input: &str) -> String {
    let mut h: i32 = 5381;
    for unit in input.encode_utf16() {
        h = h.wrapping_mul(33) ^ i32::from(unit);
    }
    to_base36(h as u32)
}

fn wide_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..8])
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}
