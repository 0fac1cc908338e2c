use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use super::{STORE_KEY_LEN, StoreError, credential::CredentialSource, disk};

/// Disk-backed credential store with an in-memory index.
///
/// Writes to one record serialize on that record's lock; lookups and writes
/// for unrelated credentials proceed concurrently. All methods take `&self`
/// so independent clients can share one store behind an `Arc`.
pub struct CredentialStore {
    aes_key: [u8; STORE_KEY_LEN],
    creds_dir: PathBuf,
    records: RwLock<HashMap<Vec<u8>, Arc<Mutex<CredentialSource>>>>,
}

impl CredentialStore {
    /// Load all credentials from `creds_dir` into memory. Corrupt files are
    /// skipped with a warning.
    pub fn open(aes_key: [u8; STORE_KEY_LEN], creds_dir: PathBuf) -> Result<Self, StoreError> {
        let mut records = HashMap::new();
        for record in disk::load_all(&aes_key, &creds_dir)? {
            records.insert(
                record.credential_id.clone(),
                Arc::new(Mutex::new(record)),
            );
        }
        Ok(Self {
            aes_key,
            creds_dir,
            records: RwLock::new(records),
        })
    }

    /// Persist a new credential. Fails with [`StoreError::Duplicate`] when a
    /// record with the same id exists; on any error the store is unchanged.
    pub fn save(&self, record: CredentialSource) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap();
        if records.contains_key(&record.credential_id) {
            return Err(StoreError::Duplicate);
        }
        disk::write_credential(&self.aes_key, &self.creds_dir, &record)?;
        records.insert(
            record.credential_id.clone(),
            Arc::new(Mutex::new(record)),
        );
        Ok(())
    }

    /// Look up one credential, bound to `rp_id`. A matching id registered
    /// for a different relying party stays invisible.
    pub fn lookup(&self, rp_id: &str, credential_id: &[u8]) -> Option<CredentialSource> {
        let records = self.records.read().unwrap();
        let slot = records.get(credential_id)?;
        let record = slot.lock().unwrap();
        (record.rp_id == rp_id).then(|| record.clone())
    }

    /// All resident credentials for `rp_id`, most recent first.
    pub fn lookup_resident(&self, rp_id: &str) -> Vec<CredentialSource> {
        let records = self.records.read().unwrap();
        let mut found: Vec<CredentialSource> = records
            .values()
            .map(|slot| slot.lock().unwrap().clone())
            .filter(|record| record.is_resident && record.rp_id == rp_id)
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found
    }

    /// Bump the signature counter and persist the record before the new
    /// value becomes visible. Returns the new counter.
    ///
    /// The map read lock is held across the write so a concurrent `remove`
    /// cannot resurrect the file; increments on unrelated records still run
    /// in parallel.
    pub fn increment_counter(&self, credential_id: &[u8]) -> Result<u32, StoreError> {
        let records = self.records.read().unwrap();
        let slot = records.get(credential_id).ok_or(StoreError::NotFound)?;
        let mut record = slot.lock().unwrap();
        let mut updated = record.clone();
        updated.sign_counter = updated.sign_counter.wrapping_add(1);
        disk::write_credential(&self.aes_key, &self.creds_dir, &updated)?;
        let counter = updated.sign_counter;
        *record = updated;
        Ok(counter)
    }

    /// Remove a credential; deletes from disk and memory. Returns whether a
    /// record was present. This is the only deletion path.
    pub fn remove(&self, credential_id: &[u8]) -> Result<bool, StoreError> {
        let mut records = self.records.write().unwrap();
        match records.remove(credential_id) {
            Some(_) => {
                disk::delete_credential(&self.creds_dir, credential_id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn credential_count(&self) -> usize {
        self.records.read().unwrap().len()
    }
}
