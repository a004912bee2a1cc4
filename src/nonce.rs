use std::time::{SystemTime, UNIX_EPOCH};

// Host epoch: 2015-01-01T00:00:00Z
const EPOCH: u64 = 1_420_070_400_000;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock went backwards")
        .as_millis() as u64
}

/// Snowflake-format nonce for a given wall-clock millisecond timestamp.
pub fn from_timestamp(ms: u64) -> String {
    ((ms - EPOCH) << 22).to_string()
}

/// Nonce for the current instant, attached to outgoing ban submissions.
pub fn generate() -> String {
    from_timestamp(now_ms())
}

pub fn timestamp_of(nonce: &str) -> Option<u64> {
    let num: u64 = nonce.parse().ok()?;
    Some((num >> 22) + EPOCH)
}
