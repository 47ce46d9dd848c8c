//! Domain-separated digests for mint authorizations and admin calls.
//!
//! Every digest commits to the signing [`Domain`] (system name, version,
//! execution-context id and registry instance), so an authorization signed
//! for one deployment never verifies against another. Mint digests further
//! bind the recipient identity and the entry stage byte.
//!
//! Layout, with `H` = BLAKE3 and `‖` = concatenation:
//!
//! ```text
//! domain_separator = H(DOMAIN_TYPE_HASH ‖ H(name) ‖ H(version) ‖ context_id_be8 ‖ registry32)
//! mint_digest      = H(0x19 ‖ 0x01 ‖ domain_separator ‖ H(MINT_TYPE_HASH ‖ to32 ‖ stage1))
//! admin_digest     = H(0x19 ‖ 0x02 ‖ domain_separator ‖ nonce_be8 ‖ H(action))
//! ```
//!
//! All functions here are pure and independent of registry state.

use lumi_core::{Domain, Identity};

use crate::hashing::{hash, hash_concat, Hash};
use crate::keys::{KeyPair, PublicKey};
use crate::signing::{sign, verify, Signature};

/// Type string of the signing domain.
pub const DOMAIN_TYPE: &str =
    "LumiDomain(string name,string version,uint64 contextId,bytes32 registry)";

/// Type string of a mint authorization.
pub const MINT_TYPE: &str = "Mint(bytes32 to,bytes1 stage)";

const MINT_PREFIX: [u8; 2] = [0x19, 0x01];
const ADMIN_PREFIX: [u8; 2] = [0x19, 0x02];

/// Hash of the domain parameters, shared by every digest in that domain.
pub fn domain_separator(domain: &Domain) -> Hash {
    let type_hash = hash(DOMAIN_TYPE.as_bytes());
    let name_hash = hash(domain.name.as_bytes());
    let version_hash = hash(domain.version.as_bytes());
    hash_concat(&[
        &type_hash,
        &name_hash,
        &version_hash,
        &domain.context_id.to_be_bytes(),
        domain.registry.as_bytes(),
    ])
}

/// Struct hash of `Mint { to, stage }`.
///
/// `stage` is the raw byte the issuer signed; range checks belong to the
/// registry, not to the digest.
pub fn mint_struct_hash(to: &Identity, stage: u8) -> Hash {
    let type_hash = hash(MINT_TYPE.as_bytes());
    hash_concat(&[&type_hash, to.as_bytes(), &[stage]])
}

/// Digest an issuer signs to authorize minting to `to` at `stage`.
pub fn mint_digest(domain: &Domain, to: &Identity, stage: u8) -> Hash {
    let separator = domain_separator(domain);
    let struct_hash = mint_struct_hash(to, stage);
    hash_concat(&[&MINT_PREFIX, &separator, &struct_hash])
}

/// Produce a mint authorization with the issuer's key pair.
pub fn sign_mint(domain: &Domain, to: &Identity, stage: u8, issuer: &KeyPair) -> Signature {
    sign(&mint_digest(domain, to, stage), issuer)
}

/// Check a mint authorization against the expected issuer identity.
///
/// Succeeds iff `signature` is a well-formed Ed25519 signature by `issuer`
/// over `mint_digest(domain, to, stage)`.
pub fn verify_mint(
    domain: &Domain,
    to: &Identity,
    stage: u8,
    signature: &[u8],
    issuer: &Identity,
) -> bool {
    verify_digest(&mint_digest(domain, to, stage), signature, issuer)
}

/// Digest an owner signs to authorize one admin call.
///
/// `action` is the canonical encoding of the call; `nonce` is the
/// caller-visible admin nonce the call is bound to.
pub fn admin_digest(domain: &Domain, nonce: u64, action: &[u8]) -> Hash {
    let separator = domain_separator(domain);
    let action_hash = hash(action);
    hash_concat(&[&ADMIN_PREFIX, &separator, &nonce.to_be_bytes(), &action_hash])
}

/// Sign an admin call.
pub fn sign_admin(domain: &Domain, nonce: u64, action: &[u8], caller: &KeyPair) -> Signature {
    sign(&admin_digest(domain, nonce, action), caller)
}

/// Check an admin call signature against the claimed caller identity.
pub fn verify_admin(
    domain: &Domain,
    nonce: u64,
    action: &[u8],
    signature: &[u8],
    caller: &Identity,
) -> bool {
    verify_digest(&admin_digest(domain, nonce, action), signature, caller)
}

fn verify_digest(digest: &Hash, signature: &[u8], signer: &Identity) -> bool {
    let signature = match Signature::from_bytes(signature) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::debug!(error = %e, "malformed signature");
            return false;
        }
    };
    let pubkey = match PublicKey::from_identity(signer) {
        Ok(pk) => pk,
        Err(e) => {
            tracing::debug!(signer = %signer, error = %e, "signer is not a valid verifying key");
            return false;
        }
    };
    verify(digest, &signature, &pubkey).is_ok()
}
