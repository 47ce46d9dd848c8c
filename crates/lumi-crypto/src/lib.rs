pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;
pub mod typed_data;

pub use error::CryptoError;
pub use hashing::{hash, hash_concat, Hash};
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature, SIGNATURE_LENGTH};
pub use typed_data::{
    admin_digest, domain_separator, mint_digest, sign_admin, sign_mint, verify_admin, verify_mint,
};
