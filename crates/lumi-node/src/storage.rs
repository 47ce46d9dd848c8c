//! RocksDB storage backend for the Lumi node.

use anyhow::{Context, Result};
use lumi_core::{Credential, CredentialId, Identity, RegistryConfig, RegistryId, Stage};
use lumi_registry::{RegistryChanges, RegistryEvent, RegistrySnapshot, StageMetadataStore};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Column family names for different data types.
const CF_CREDENTIALS: &str = "credentials";
const CF_OWNERS: &str = "owners";
const CF_DESCRIPTORS: &str = "descriptors";
const CF_INDEX: &str = "index";
const CF_EVENTS: &str = "events";
const CF_STATE: &str = "state";

const KEY_CONFIG: &str = "config";
const KEY_REGISTRY_ID: &str = "registry_id";
const KEY_OWNER: &str = "owner";
const KEY_ISSUER: &str = "issuer";
const KEY_INITIALIZED: &str = "initialized";
const KEY_NEXT_ID: &str = "next_id";
const KEY_ADMIN_NONCE: &str = "admin_nonce";

/// RocksDB-backed storage for the registry state.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = [
            CF_CREDENTIALS,
            CF_OWNERS,
            CF_DESCRIPTORS,
            CF_INDEX,
            CF_EVENTS,
            CF_STATE,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
        .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    fn cf(&self, cf_name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(cf_name)
            .ok_or_else(|| anyhow::anyhow!("column family '{}' not found", cf_name))
    }

    /// Get a value from a column family.
    pub fn get(&self, cf_name: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf_name)?;
        let value = self.db.get_cf(cf, key)?;
        Ok(value)
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        match self.get(cf_name, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes).with_context(|| {
                format!("decoding {}/{}", cf_name, String::from_utf8_lossy(key))
            })?)),
            None => Ok(None),
        }
    }

    fn values<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .iterator_cf(cf, IteratorMode::Start)
            .map(|item| {
                let (_, value) = item?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    /// Persist a full registry snapshot and the admin nonce in one batch.
    /// Used when a registry is first created.
    pub fn save_snapshot(&self, snapshot: &RegistrySnapshot, admin_nonce: u64) -> Result<()> {
        let mut batch = WriteBatch::default();
        let state = self.cf(CF_STATE)?;
        batch.put_cf(state, KEY_CONFIG, serde_json::to_vec(&snapshot.config)?);
        batch.put_cf(state, KEY_REGISTRY_ID, snapshot.registry_id.as_bytes());
        self.stage_changes(&mut batch, &snapshot.as_changes(), admin_nonce)?;

        self.db.write(batch)?;
        tracing::debug!(
            credentials = snapshot.credentials.len(),
            events = snapshot.events.len(),
            "snapshot persisted"
        );
        Ok(())
    }

    /// Persist the rows one registry operation touched, together with the
    /// admin nonce, in one batch. Returns the number of rows written.
    pub fn save_changes(&self, changes: &RegistryChanges<'_>, admin_nonce: u64) -> Result<usize> {
        let mut batch = WriteBatch::default();
        self.stage_changes(&mut batch, changes, admin_nonce)?;
        let rows = batch.len();
        self.db.write(batch)?;
        tracing::debug!(
            rows,
            credentials = changes.credentials.len(),
            events = changes.events.len(),
            "changes persisted"
        );
        Ok(rows)
    }

    fn stage_changes(
        &self,
        batch: &mut WriteBatch,
        changes: &RegistryChanges<'_>,
        admin_nonce: u64,
    ) -> Result<()> {
        // Ids are dense and allocated in mint order, so the id doubles as
        // the enumeration position.
        let credentials = self.cf(CF_CREDENTIALS)?;
        let owners = self.cf(CF_OWNERS)?;
        let index = self.cf(CF_INDEX)?;
        for credential in &changes.credentials {
            let id_key = credential.id.value().to_be_bytes();
            batch.put_cf(credentials, id_key, serde_json::to_vec(credential)?);
            batch.put_cf(owners, credential.owner.as_bytes(), id_key);
            batch.put_cf(index, id_key, id_key);
        }

        let descriptors = self.cf(CF_DESCRIPTORS)?;
        for stage in Stage::ALL {
            if let Some(content) = changes.descriptors.get(stage) {
                batch.put_cf(descriptors, [stage.as_u8()], serde_json::to_vec(content)?);
            }
        }

        let events = self.cf(CF_EVENTS)?;
        for event in changes.events {
            batch.put_cf(events, event.seq.to_be_bytes(), serde_json::to_vec(event)?);
        }

        let state = self.cf(CF_STATE)?;
        if let Some(owner) = &changes.owner {
            batch.put_cf(state, KEY_OWNER, owner.as_bytes());
        }
        if let Some(issuer) = &changes.issuer {
            batch.put_cf(state, KEY_ISSUER, issuer.as_bytes());
        }
        batch.put_cf(state, KEY_INITIALIZED, [u8::from(changes.initialized)]);
        batch.put_cf(state, KEY_NEXT_ID, changes.next_id.value().to_be_bytes());
        batch.put_cf(state, KEY_ADMIN_NONCE, admin_nonce.to_be_bytes());
        Ok(())
    }

    /// Load the stored registry snapshot and admin nonce, if a registry has
    /// ever been saved here.
    pub fn load_snapshot(&self) -> Result<Option<(RegistrySnapshot, u64)>> {
        let Some(registry_id) = self.get(CF_STATE, KEY_REGISTRY_ID.as_bytes())? else {
            return Ok(None);
        };
        let registry_id = RegistryId(bytes32(&registry_id, KEY_REGISTRY_ID)?);
        let config: RegistryConfig = self
            .get_json(CF_STATE, KEY_CONFIG.as_bytes())?
            .unwrap_or_default();
        let owner = self
            .get(CF_STATE, KEY_OWNER.as_bytes())?
            .map(|b| bytes32(&b, KEY_OWNER).map(Identity))
            .transpose()?;
        let issuer = self
            .get(CF_STATE, KEY_ISSUER.as_bytes())?
            .map(|b| bytes32(&b, KEY_ISSUER).map(Identity))
            .transpose()?;
        let initialized = self
            .get(CF_STATE, KEY_INITIALIZED.as_bytes())?
            .is_some_and(|b| b.first() == Some(&1));
        let next_id = CredentialId(self.get_u64(CF_STATE, KEY_NEXT_ID.as_bytes())?);
        let admin_nonce = self.get_u64(CF_STATE, KEY_ADMIN_NONCE.as_bytes())?;

        let mut descriptors = StageMetadataStore::default();
        for stage in Stage::ALL {
            if let Some(content) = self.get_json(CF_DESCRIPTORS, &[stage.as_u8()])? {
                descriptors.set(stage, content);
            }
        }

        let index_cf = self.cf(CF_INDEX)?;
        let mut credentials = Vec::new();
        for item in self.db.iterator_cf(index_cf, IteratorMode::Start) {
            let (_, id_key) = item?;
            let credential: Credential = self
                .get_json(CF_CREDENTIALS, &id_key)?
                .ok_or_else(|| anyhow::anyhow!("index points at a missing credential"))?;
            credentials.push(credential);
        }

        let events: Vec<RegistryEvent> = self.values(CF_EVENTS)?;

        Ok(Some((
            RegistrySnapshot {
                config,
                registry_id,
                owner,
                issuer,
                descriptors,
                initialized,
                next_id,
                credentials,
                events,
            },
            admin_nonce,
        )))
    }

    fn get_u64(&self, cf_name: &str, key: &[u8]) -> Result<u64> {
        match self.get(cf_name, key)? {
            Some(bytes) => be_u64(&bytes, cf_name),
            None => Ok(0),
        }
    }
}

fn bytes32(bytes: &[u8], what: &str) -> Result<[u8; 32]> {
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("{}: expected 32 bytes, got {}", what, bytes.len()))
}

fn be_u64(bytes: &[u8], what: &str) -> Result<u64> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("{}: expected 8 bytes, got {}", what, bytes.len()))?;
    Ok(u64::from_be_bytes(array))
}
