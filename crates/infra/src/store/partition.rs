use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use shelfwatch_core::AccountId;

use super::StoreError;

/// Account-partitioned in-memory state for tests/dev.
///
/// Each account owns its own partition behind its own mutex. The outer map is
/// only locked long enough to find (or create) a partition, so work on one
/// account never waits on work for another, while all writes within one
/// account are serialized (which is what makes conditional inserts atomic).
#[derive(Debug)]
pub struct AccountPartitions<T> {
    inner: RwLock<HashMap<AccountId, Arc<Mutex<T>>>>,
}

impl<T> AccountPartitions<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for AccountPartitions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default> AccountPartitions<T> {
    /// Run `f` on the account's partition; `None` if the account has no data yet.
    pub fn read<R>(&self, account: AccountId, f: impl FnOnce(&T) -> R) -> Result<Option<R>, StoreError> {
        match self.existing(account)? {
            None => Ok(None),
            Some(partition) => {
                let guard = partition.lock().map_err(|_| poisoned())?;
                Ok(Some(f(&guard)))
            }
        }
    }

    /// Run `f` on an existing partition; `None` if the account has no data yet.
    ///
    /// For removals, which have nothing to do on an account never written to.
    pub fn update<R>(&self, account: AccountId, f: impl FnOnce(&mut T) -> R) -> Result<Option<R>, StoreError> {
        match self.existing(account)? {
            None => Ok(None),
            Some(partition) => {
                let mut guard = partition.lock().map_err(|_| poisoned())?;
                Ok(Some(f(&mut guard)))
            }
        }
    }

    /// Run `f` on the account's partition, creating it if needed.
    pub fn write<R>(&self, account: AccountId, f: impl FnOnce(&mut T) -> R) -> Result<R, StoreError> {
        let partition = self.partition(account)?;
        let mut guard = partition.lock().map_err(|_| poisoned())?;
        Ok(f(&mut guard))
    }

    /// The account's partition, if it was ever written to.
    pub fn existing(&self, account: AccountId) -> Result<Option<Arc<Mutex<T>>>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&account).cloned())
    }

    fn partition(&self, account: AccountId) -> Result<Arc<Mutex<T>>, StoreError> {
        {
            let map = self.inner.read().map_err(|_| poisoned())?;
            if let Some(p) = map.get(&account) {
                return Ok(p.clone());
            }
        }

        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.entry(account).or_default().clone())
    }
}

impl<T> AccountPartitions<T> {
    #[cfg(test)]
    pub(crate) fn contains(&self, account: AccountId) -> bool {
        self.inner
            .read()
            .map(|map| map.contains_key(&account))
            .unwrap_or(false)
    }
}

pub(super) fn poisoned() -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}
