use lumi_core::{Domain, Identity};
use lumi_crypto::typed_data;
use serde::{Deserialize, Serialize};

/// Verifies issuer-signed mint authorizations for one registry domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureAuthority {
    domain: Domain,
    issuer: Option<Identity>,
}

impl SignatureAuthority {
    /// Authority with no issuer yet; every verification fails until one is set.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            issuer: None,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The currently trusted issuer.
    pub fn issuer(&self) -> Option<&Identity> {
        self.issuer.as_ref()
    }

    /// Replace the trusted issuer. Takes effect for the next `verify`.
    pub fn set_issuer(&mut self, issuer: Identity) {
        self.issuer = Some(issuer);
    }

    /// Whether `signature` authorizes minting to `to` at the raw `stage`
    /// byte under the current issuer.
    pub fn verify(&self, to: &Identity, stage: u8, signature: &[u8]) -> bool {
        let Some(issuer) = self.issuer.as_ref() else {
            tracing::debug!(to = %to, "no issuer configured");
            return false;
        };
        typed_data::verify_mint(&self.domain, to, stage, signature, issuer)
    }
}
