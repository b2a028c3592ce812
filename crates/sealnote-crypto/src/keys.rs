use rand::RngCore;

use crate::CipherError;

/// Process-wide AES-256 key. Validated once at construction, immutable
/// afterwards, so encode/decode never re-check the length.
#[derive(Clone)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Build a key from a configuration string, taking its UTF-8 bytes as-is
    /// (no hex or base64 decoding). Anything other than exactly 32 bytes is
    /// a configuration error.
    pub fn from_utf8(value: &str) -> Result<Self, CipherError> {
        let bytes = value.as_bytes();
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CipherError::Configuration(bytes.len()))?;
        Ok(Self(key))
    }

    /// Generate a random 256-bit key.
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        rand::rng().fill_bytes(&mut key);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("SecretKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_32_bytes() {
        let key = SecretKey::from_utf8("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = SecretKey::from_utf8("too-short").unwrap_err();
        assert!(matches!(err, CipherError::Configuration(9)));

        let err = SecretKey::from_utf8(&"x".repeat(33)).unwrap_err();
        assert!(matches!(err, CipherError::Configuration(33)));
    }

    #[test]
    fn length_is_bytes_not_chars() {
        // 32 chars but more than 32 bytes once encoded
        let value = format!("é{}", "x".repeat(31));
        assert_eq!(value.chars().count(), 32);
        assert!(SecretKey::from_utf8(&value).is_err());
    }

    #[test]
    fn debug_hides_key_material() {
        let key = SecretKey::from_utf8("0123456789abcdef0123456789abcdef").unwrap();
        assert_eq!(format!("{:?}", key), "SecretKey(..)");
    }
}
