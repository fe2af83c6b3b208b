//! Client configuration.
//!
//! `ScannerConfig` is what callers write (every field optional, also
//! loadable with serde); `ResolvedConfig` is what a client holds after
//! defaults are applied. Resolution happens once per client and the result
//! never changes.

use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://halallens.no/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const DEVICE_ID_PREFIX: &str = "hs-";
const DEVICE_ID_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const DEVICE_ID_SUFFIX_LEN: usize = 16;

/// Caller-facing options. Empty strings and a zero timeout count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub base_url: Option<String>,
    /// Identifies this client to the service for usage tracking.
    pub device_id: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl ScannerConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn resolve(self) -> ResolvedConfig {
        let base_url = self
            .base_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = match base_url.strip_suffix('/') {
            Some(stripped) => stripped.to_string(),
            None => base_url,
        };
        let device_id = self
            .device_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generate_device_id);
        let timeout = self
            .timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        ResolvedConfig {
            base_url,
            device_id,
            timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub device_id: String,
    pub timeout: Duration,
}

/// `hs-` followed by 16 lowercase alphanumerics, drawn from a v4 UUID.
pub fn generate_device_id() -> String {
    let mut value = random_bits(Uuid::new_v4());
    let radix = DEVICE_ID_ALPHABET.len() as u128;
    let suffix: String = (0..DEVICE_ID_SUFFIX_LEN)
        .map(|_| {
            let digit = (value % radix) as usize;
            value /= radix;
            DEVICE_ID_ALPHABET[digit] as char
        })
        .collect();
    format!("{DEVICE_ID_PREFIX}{suffix}")
}

/// The 122 random bits of a v4 UUID, with the version nibble (bits 76..80)
/// and variant bits (62..64) squeezed out.
fn random_bits(uuid: Uuid) -> u128 {
    let raw = uuid.as_u128();
    let low = raw & ((1 << 62) - 1);
    let mid = (raw >> 64) & 0xfff;
    let high = raw >> 80;
    (high << 74) | (mid << 62) | low
}
