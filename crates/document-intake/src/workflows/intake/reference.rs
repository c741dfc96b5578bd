use chrono::{DateTime, Utc};

use super::domain::ReferenceNumber;

const SUFFIX_LEN: usize = 4;
const RADIX: u32 = 36;

/// Source of candidate reference numbers. Uniqueness is enforced by the repository.
pub trait ReferenceIssuer: Send + Sync {
    fn issue(&self, issued_at: DateTime<Utc>) -> ReferenceNumber;
}

/// `<PREFIX>-<base36 millis><4 random base36 chars>`, all uppercase.
#[derive(Debug, Clone)]
pub struct ReferenceNumberGenerator {
    prefix: String,
}

impl ReferenceNumberGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_ascii_uppercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for ReferenceNumberGenerator {
    fn default() -> Self {
        Self::new("APP")
    }
}

impl ReferenceIssuer for ReferenceNumberGenerator {
    fn issue(&self, issued_at: DateTime<Utc>) -> ReferenceNumber {
        let millis = issued_at.timestamp_millis().max(0) as u64;
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| base36_digit(rand::random_range(0..RADIX)))
            .collect();
        ReferenceNumber(format!("{}-{}{}", self.prefix, to_base36(millis), suffix))
    }
}

fn base36_digit(value: u32) -> char {
    char::from_digit(value, RADIX)
        .map(|digit| digit.to_ascii_uppercase())
        .unwrap_or('0')
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(base36_digit((value % RADIX as u64) as u32));
        value /= RADIX as u64;
    }
    digits.iter().rev().collect()
}
