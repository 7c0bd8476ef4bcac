//! RocksDB-backed storage engine.
//!
//! # Lock Semantics
//!
//! RocksDB itself is thread-safe, but we use coarse-grained mutexes so each guarded
//! test-and-set reads and writes under one critical section.
//!
//! - `election_lock`: ballot edits, status compare-and-set, seal recording.
//! - `ledger_lock`: ballot commit (uniqueness key + vote rows + receipt).
//! - `report_lock`: report inserts (zero-report uniqueness).
//!
//! Locks are acquired with a bounded timeout (`STORAGE_LOCK_TIMEOUT_SECS`). A zero-report
//! insert holds `report_lock` and then takes `ledger_lock`; no path takes them in the
//! other order.
//!
//! # Column Families
//!
//! See `schema.rs` for column family names and key layout.

use crate::foundation::{ElectionId, PositionId, UrnaError, VoterId};
use crate::infrastructure::storage::rocks::migration::open_db_with_cfs;
use crate::infrastructure::storage::rocks::schema::*;
use crate::storage_err;
use bincode::Options;
use log::{debug, info, warn};
use rocksdb::{checkpoint::Checkpoint, ColumnFamily, Direction, IteratorMode, DB};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::fs;

mod batch;
mod store;

const LEDGER_DIR_NAME: &str = "urna-ledger";

pub struct RocksStorage {
    db: Arc<DB>,
    election_lock: Mutex<()>,
    ledger_lock: Mutex<()>,
    report_lock: Mutex<()>,
}

impl RocksStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, UrnaError> {
        Self::open_with_options(path, false)
    }

    pub fn open_with_options(path: impl AsRef<Path>, allow_schema_wipe: bool) -> Result<Self, UrnaError> {
        let path = path.as_ref();
        debug!("opening RocksStorage path={}", path.display());
        let db = open_db_with_cfs(path)?;
        let storage = Self { db: Arc::new(db), election_lock: Mutex::new(()), ledger_lock: Mutex::new(()), report_lock: Mutex::new(()) };
        if let Err(err) = storage.maybe_run_migrations() {
            if allow_schema_wipe {
                if let UrnaError::SchemaMismatch { stored, current } = err {
                    warn!("schema mismatch (stored={}, current={}); wiping db path={}", stored, current, path.display());
                    drop(storage);
                    if path.exists() {
                        fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all schema_wipe", err))?;
                    }
                    return Self::open_with_options(path, false);
                }
            }
            return Err(err);
        }
        info!("RocksStorage opened path={}", path.display());
        Ok(storage)
    }

    pub fn open_in_dir(data_dir: impl AsRef<Path>) -> Result<Self, UrnaError> {
        Self::open_in_dir_with_options(data_dir, false)
    }

    pub fn open_in_dir_with_options(data_dir: impl AsRef<Path>, allow_schema_wipe: bool) -> Result<Self, UrnaError> {
        let dir = data_dir.as_ref();
        if dir.as_os_str().is_empty() {
            return Err(UrnaError::StorageError { operation: "open_in_dir".to_string(), details: "empty data dir".to_string() });
        }
        fs::create_dir_all(dir).map_err(|err| storage_err!("fs::create_dir_all open_in_dir", err))?;
        let path = dir.join(LEDGER_DIR_NAME);
        debug!("opening RocksStorage in dir path={}", path.display());
        Self::open_with_options(path, allow_schema_wipe)
    }

    pub fn create_checkpoint(&self, path: impl AsRef<Path>) -> Result<(), UrnaError> {
        let path = path.as_ref();
        info!("creating RocksStorage checkpoint path={}", path.display());
        if path.exists() {
            let mut entries = fs::read_dir(path).map_err(|err| storage_err!("fs::read_dir checkpoint", err))?;
            if entries.next().is_some() {
                return Err(UrnaError::StorageError {
                    operation: "rocksdb checkpoint".to_string(),
                    details: format!("checkpoint directory is not empty: {}", path.display()),
                });
            }
            fs::remove_dir_all(path).map_err(|err| storage_err!("fs::remove_dir_all checkpoint", err))?;
        }
        let checkpoint = Checkpoint::new(&self.db).map_err(|err| storage_err!("rocksdb::Checkpoint::new", err))?;
        checkpoint.create_checkpoint(path).map_err(|err| storage_err!("rocksdb::create_checkpoint", err))?;
        info!("checkpoint created path={}", path.display());
        Ok(())
    }

    fn cf_handle(&self, name: &str) -> Result<&ColumnFamily, UrnaError> {
        self.db.cf_handle(name).ok_or_else(|| UrnaError::StorageError {
            operation: "rocksdb cf_handle".to_string(),
            details: format!("missing column family: {}", name),
        })
    }

    fn maybe_run_migrations(&self) -> Result<(), UrnaError> {
        match self.schema_version()? {
            None => {
                info!("initializing fresh db schema schema_version={}", SCHEMA_VERSION);
                self.set_schema_version(SCHEMA_VERSION)?;
            }
            Some(v) if v == SCHEMA_VERSION => {}
            Some(v) => return Err(UrnaError::SchemaMismatch { stored: v, current: SCHEMA_VERSION }),
        }
        Ok(())
    }

    fn schema_version(&self) -> Result<Option<u32>, UrnaError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self.db.get_cf(cf, SCHEMA_VERSION_KEY) {
            Ok(Some(bytes)) => {
                let array: [u8; 4] = bytes.as_slice().try_into().map_err(|_| UrnaError::StorageError {
                    operation: "schema_version decode".to_string(),
                    details: "corrupt schema version".to_string(),
                })?;
                Ok(Some(u32::from_be_bytes(array)))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(storage_err!("rocksdb get_cf schema_version", err)),
        }
    }

    fn set_schema_version(&self, version: u32) -> Result<(), UrnaError> {
        let cf = self.cf_handle(CF_METADATA)?;
        self.db.put_cf(cf, SCHEMA_VERSION_KEY, version.to_be_bytes()).map_err(UrnaError::from)
    }

    fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, UrnaError> {
        bincode::DefaultOptions::new().with_fixint_encoding().serialize(value).map_err(|err| err.into())
    }

    fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, UrnaError> {
        bincode::DefaultOptions::new().with_fixint_encoding().deserialize(bytes).map_err(|err| err.into())
    }

    fn get_decoded<T: serde::de::DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>, UrnaError> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.get_cf(cf, key).map_err(|err| storage_err!(format!("rocksdb get_cf {}", cf_name), err))? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_encoded<T: serde::Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<(), UrnaError> {
        let cf = self.cf_handle(cf_name)?;
        let bytes = Self::encode(value)?;
        self.db.put_cf(cf, key, bytes).map_err(|err| storage_err!(format!("rocksdb put_cf {}", cf_name), err))
    }

    fn key_exists(&self, cf_name: &str, key: &[u8]) -> Result<bool, UrnaError> {
        let cf = self.cf_handle(cf_name)?;
        Ok(self.db.get_pinned_cf(cf, key).map_err(|err| storage_err!(format!("rocksdb get_pinned_cf {}", cf_name), err))?.is_some())
    }

    fn has_prefix(&self, cf_name: &str, prefix: &[u8]) -> Result<bool, UrnaError> {
        let cf = self.cf_handle(cf_name)?;
        match self.db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)).next() {
            Some(item) => {
                let (key, _) = item.map_err(|err| storage_err!(format!("rocksdb iterator_cf {}", cf_name), err))?;
                Ok(key.starts_with(prefix))
            }
            None => Ok(false),
        }
    }

    /// Decodes every value whose key starts with `prefix` (empty prefix scans the family).
    fn scan_prefix<T: serde::de::DeserializeOwned>(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<T>, UrnaError> {
        let cf = self.cf_handle(cf_name)?;
        let mut out = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item.map_err(|err| storage_err!(format!("rocksdb iterator_cf {}", cf_name), err))?;
            if !key.starts_with(prefix) {
                break;
            }
            out.push(Self::decode(&value)?);
        }
        Ok(out)
    }

    fn key_id(id: u64) -> Vec<u8> {
        KeyBuilder::with_capacity(8).u64_be(id).build()
    }

    fn key_vote(election_id: ElectionId, tx_id: &str, position_id: PositionId) -> Vec<u8> {
        KeyBuilder::with_capacity(8 + 1 + tx_id.len() + 1 + 8)
            .u64_be(election_id.value())
            .sep()
            .str(tx_id)
            .sep()
            .u64_be(position_id.value())
            .build()
    }

    fn key_election_prefix(election_id: ElectionId) -> Vec<u8> {
        KeyBuilder::with_capacity(9).u64_be(election_id.value()).sep().build()
    }

    fn key_vote_tx(tx_id: &str, position_id: PositionId) -> Vec<u8> {
        KeyBuilder::with_capacity(tx_id.len() + 1 + 8).str(tx_id).sep().u64_be(position_id.value()).build()
    }

    fn key_vote_tx_prefix(tx_id: &str) -> Vec<u8> {
        KeyBuilder::with_capacity(tx_id.len() + 1).str(tx_id).sep().build()
    }

    fn key_ballot(election_id: ElectionId, voter_id: VoterId) -> Vec<u8> {
        KeyBuilder::with_capacity(17).u64_be(election_id.value()).sep().u64_be(voter_id.value()).build()
    }

    fn key_report(election_id: ElectionId, report_id: &str) -> Vec<u8> {
        KeyBuilder::with_capacity(9 + report_id.len()).u64_be(election_id.value()).sep().str(report_id).build()
    }
}
