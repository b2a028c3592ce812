use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

use crate::CipherError;
use crate::keys::SecretKey;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_LEN: usize = 16;

/// Encrypt a plaintext message with AES-256-CBC and PKCS7 padding.
/// Returns `hex(iv):hex(ciphertext)` with a fresh random IV, so encoding the
/// same plaintext twice never yields the same token.
pub fn encode(plaintext: &str, key: &SecretKey) -> String {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(key.as_bytes().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    format!("{}:{}", hex::encode(iv), hex::encode(ciphertext))
}

/// Decrypt a token produced by [`encode`].
///
/// The token is split on the FIRST `:` only; any further `:` stays part of
/// the ciphertext payload and fails hex decoding there rather than shifting
/// the frame.
pub fn decode(token: &str, key: &SecretKey) -> Result<String, CipherError> {
    let (iv_hex, ciphertext_hex) = token
        .split_once(':')
        .ok_or(CipherError::MalformedToken("missing ':' separator"))?;

    let iv = hex::decode(iv_hex).map_err(|_| CipherError::MalformedToken("invalid iv hex"))?;
    let iv: [u8; IV_LEN] = iv
        .try_into()
        .map_err(|_| CipherError::MalformedToken("iv must be 16 bytes"))?;

    let ciphertext = hex::decode(ciphertext_hex)
        .map_err(|_| CipherError::MalformedToken("invalid ciphertext hex"))?;

    let plaintext = Aes256CbcDec::new(key.as_bytes().into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CipherError::MalformedToken("decryption failed"))?;

    String::from_utf8(plaintext).map_err(|_| CipherError::MalformedToken("plaintext is not utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SecretKey {
        SecretKey::from_utf8("0123456789abcdef0123456789abcdef").unwrap()
    }

    #[test]
    fn encode_decode_roundtrip() {
        let key = test_key();
        let token = encode("Hello from Sealnote!", &key);

        assert_eq!(token.matches(':').count(), 1);
        assert_eq!(decode(&token, &key).unwrap(), "Hello from Sealnote!");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let key = test_key();
        let token = encode("", &key);
        assert_eq!(decode(&token, &key).unwrap(), "");
    }

    #[test]
    fn fresh_iv_per_call() {
        let key = test_key();
        let a = encode("same input", &key);
        let b = encode("same input", &key);

        assert_ne!(a, b);
        assert_eq!(decode(&a, &key).unwrap(), "same input");
        assert_eq!(decode(&b, &key).unwrap(), "same input");
    }

    #[test]
    fn wrong_key_fails() {
        let token = encode("secret message", &test_key());
        let other = SecretKey::generate();

        let err = decode(&token, &other).unwrap_err();
        assert!(matches!(err, CipherError::MalformedToken(_)));
    }

    #[test]
    fn missing_separator_fails() {
        let err = decode("deadbeef", &test_key()).unwrap_err();
        assert!(matches!(err, CipherError::MalformedToken(_)));
    }

    #[test]
    fn invalid_hex_fails() {
        let key = test_key();
        assert!(decode("zz:zz", &key).is_err());

        // Extra ':' in the payload is not a second frame separator; it makes
        // the payload invalid hex.
        let iv_hex = "00".repeat(16);
        assert!(decode(&format!("{iv_hex}:aabb:ccdd"), &key).is_err());
    }

    #[test]
    fn short_iv_fails() {
        let err = decode("aabb:00112233445566778899aabbccddeeff", &test_key()).unwrap_err();
        assert!(matches!(err, CipherError::MalformedToken(_)));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let key = test_key();
        let token = encode("truncate me", &key);

        // Drop a single hex digit; no longer a whole number of blocks.
        let ragged = &token[..token.len() - 1];
        assert!(matches!(
            decode(ragged, &key).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
    }

    #[test]
    fn corrupted_ciphertext_fails() {
        let key = test_key();
        // 30 bytes of plaintext: two ciphertext blocks, two bytes of padding.
        let token = encode("integrity is not a CBC feature", &key);
        let (iv_hex, ct_hex) = token.split_once(':').unwrap();

        // Flip the low bit of the last byte of the first ciphertext block.
        // CBC chaining flips the same bit in the final padding byte of the
        // second block, so padding validation rejects the token.
        let mut ct = ct_hex.as_bytes().to_vec();
        let digit = (ct[31] as char).to_digit(16).unwrap();
        ct[31] = std::char::from_digit(digit ^ 1, 16).unwrap() as u8;

        let tampered = format!("{}:{}", iv_hex, String::from_utf8(ct).unwrap());
        assert!(matches!(
            decode(&tampered, &key).unwrap_err(),
            CipherError::MalformedToken(_)
        ));
    }
}
