use ed25519_dalek::{SigningKey, VerifyingKey};
use lumi_core::Identity;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Ed25519 key pair held by an issuer, an owner, or a credential holder.
/// Private key material is zeroized on drop by ed25519-dalek.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create a key pair from raw secret bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    /// Decode a hex-encoded secret key, as stored in key files.
    pub fn from_hex(hex_str: &str) -> Result<Self, CryptoError> {
        let mut bytes = hex::decode(hex_str.trim())
            .map_err(|e| CryptoError::InvalidInput(format!("invalid hex: {}", e)))?;
        let kp = Self::from_bytes(&bytes);
        bytes.zeroize();
        kp
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// The identity controlled by this key pair.
    pub fn identity(&self) -> Identity {
        self.public_key().identity()
    }

    /// Get the raw private key bytes (32 bytes).
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Hex-encode the private key for a key file.
    pub fn secret_hex(&self) -> String {
        let mut bytes = self.secret_bytes();
        let encoded = hex::encode(bytes);
        bytes.zeroize();
        encoded
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    /// Interpret an identity as a verifying key. Fails when the identity
    /// bytes are not a valid curve point.
    pub fn from_identity(identity: &Identity) -> Result<Self, CryptoError> {
        Self::from_bytes(identity.as_bytes())
    }

    /// The identity this key verifies for.
    pub fn identity(&self) -> Identity {
        Identity(*self.verifying_key.as_bytes())
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_keypair() {
        let kp = KeyPair::generate();
        assert_eq!(kp.public_key().as_bytes().len(), 32);
    }

    #[test]
    fn test_from_seed_deterministic() {
        let seed = [42u8; 32];
        let kp1 = KeyPair::from_seed(&seed);
        let kp2 = KeyPair::from_seed(&seed);
        assert_eq!(kp1.identity(), kp2.identity());
    }

    #[test]
    fn test_from_bytes_invalid_length() {
        let result = KeyPair::from_bytes(&[0u8; 16]);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let kp = KeyPair::generate();
        let restored = KeyPair::from_hex(&kp.secret_hex()).unwrap();
        assert_eq!(kp.identity(), restored.identity());
    }

    #[test]
    fn test_from_hex_tolerates_trailing_newline() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        let file_contents = format!("{}\n", kp.secret_hex());
        let restored = KeyPair::from_hex(&file_contents).unwrap();
        assert_eq!(kp.identity(), restored.identity());
    }

    #[test]
    fn test_identity_roundtrip_through_public_key() {
        let kp = KeyPair::from_seed(&[3u8; 32]);
        let identity = kp.identity();
        let pk = PublicKey::from_identity(&identity).unwrap();
        assert_eq!(pk, kp.public_key());
        assert_eq!(pk.identity(), identity);
        assert_eq!(pk.to_hex(), identity.to_hex());
    }

    #[test]
    fn test_public_key_from_bytes_invalid() {
        assert!(PublicKey::from_bytes(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_different_seeds_different_keys() {
        let kp1 = KeyPair::from_seed(&[1u8; 32]);
        let kp2 = KeyPair::from_seed(&[2u8; 32]);
        assert_ne!(kp1.identity(), kp2.identity());
    }
}
