use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::foundation::error::{CertError, CertResult};

/// Characters in a verification code, separator excluded.
pub const CODE_LEN: usize = 10;

const CROCKFORD: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const DOMAIN: &[u8] = b"certiforge/verify/v1";

/// Server-issued secret mixed into every verification code of a batch.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationSeed([u8; 32]);

impl std::fmt::Debug for VerificationSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationSeed(..)")
    }
}

impl VerificationSeed {
    /// Draw 32 random bytes from the thread-local generator.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Seed from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse 64 hexadecimal characters.
    pub fn from_hex(s: &str) -> CertResult<Self> {
        let s = s.trim();
        if s.len() != 64 || !s.is_ascii() {
            return Err(CertError::validation(
                "verification seed must be 64 hex characters",
            ));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| {
                CertError::validation("verification seed must be 64 hex characters")
            })?;
        }
        Ok(Self(bytes))
    }

    /// Lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// Derive the verification code for one output.
///
/// The code is SHA-256 over the template id, row index and seed, truncated to 50 bits and
/// written as ten Crockford base32 characters grouped `XXXXX-XXXXX`. The same inputs always give
/// the same code.
pub fn verification_code(template_id: &str, row_index: usize, seed: &VerificationSeed) -> String {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    hasher.update((template_id.len() as u64).to_le_bytes());
    hasher.update(template_id.as_bytes());
    hasher.update((row_index as u64).to_le_bytes());
    hasher.update(seed.0);
    let digest = hasher.finalize();

    let mut bits = u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ]) >> (64 - 5 * CODE_LEN);

    let mut chars = [0u8; CODE_LEN];
    for c in chars.iter_mut().rev() {
        *c = CROCKFORD[(bits & 0x1f) as usize];
        bits >>= 5;
    }
    let mut out = String::with_capacity(CODE_LEN + 1);
    for (i, c) in chars.iter().enumerate() {
        if i == CODE_LEN / 2 {
            out.push('-');
        }
        out.push(char::from(*c));
    }
    out
}

/// Check that `code` has the shape produced by [`verification_code`].
///
/// Lowercase input and the Crockford aliases `O`, `I` and `L` are accepted.
pub fn normalize_code(code: &str) -> Option<String> {
    let mut chars = Vec::with_capacity(CODE_LEN);
    for c in code.trim().chars().filter(|c| *c != '-') {
        let c = match c.to_ascii_uppercase() {
            'O' => '0',
            'I' | 'L' => '1',
            other => other,
        };
        if !c.is_ascii() || !CROCKFORD.contains(&(c as u8)) {
            return None;
        }
        chars.push(c);
    }
    if chars.len() != CODE_LEN {
        return None;
    }
    let (head, tail) = chars.split_at(CODE_LEN / 2);
    Some(format!(
        "{}-{}",
        head.iter().collect::<String>(),
        tail.iter().collect::<String>()
    ))
}

/// Metadata recorded for each generated certificate.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GenerationMetadata {
    /// Template the output was rendered from.
    pub template_id: String,
    /// Zero-based row index within the batch.
    pub row_index: usize,
    /// Render completion time.
    pub generated_at: DateTime<Utc>,
    /// Verification code, when the batch issues them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
}

impl GenerationMetadata {
    /// Metadata stamped with the current time.
    pub fn now(
        template_id: impl Into<String>,
        row_index: usize,
        verification_code: Option<String>,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            row_index,
            generated_at: Utc::now(),
            verification_code,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/verify.rs"]
mod tests;
