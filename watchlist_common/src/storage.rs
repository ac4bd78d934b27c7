//! Key-value storage façade with change subscriptions.
//!
//! Everything that persists state goes through [`KeyValueStore`], handed in
//! explicitly by the caller. Values are stored as `serde_json::Value`; the
//! [`KeyValueStoreExt`] helpers convert domain types on the way in and out.
//!
//! Every handle of a store shares one subscriber registry. A write through any
//! handle notifies all subscribers of the touched keys over their channel, so a
//! clone of a store models another execution context looking at the same data.
//! `FileStore::watch` extends that to writes made by other processes.
//!
//! There is no compare-and-swap: two contexts doing read-modify-write on the
//! same key can race and the last write wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WatchlistError;
use crate::result::Result;

/// Key holding the serialized sequence of symbol lists.
pub const SYMBOL_LISTS_KEY: &str = "symbolLists";
/// Key holding the id of the selected list, absent when none is selected.
pub const CURRENT_LIST_KEY: &str = "currentListId";
/// Key holding `AppSettings`.
pub const SETTINGS_KEY: &str = "settings";

/// Full contents of a store, ordered by key.
pub type Snapshot = BTreeMap<String, Value>;

/// One key's transition, delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    /// Key that changed.
    pub key: String,
    /// Value before the write, `None` if the key was absent.
    pub old_value: Option<Value>,
    /// Value after the write, `None` if the key was removed.
    pub new_value: Option<Value>,
}

/// Asynchronous-delivery key-value store.
///
/// Reads and writes return once the backend has answered; change notifications
/// are queued on each subscriber's channel and consumed whenever the
/// subscriber gets to them.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Every key and value currently stored.
    fn snapshot(&self) -> Result<Snapshot>;

    /// Apply several writes as one step; `None` removes the key.
    ///
    /// Either every entry is persisted or none is.
    fn write_batch(&self, entries: Vec<(String, Option<Value>)>) -> Result<()>;

    /// Remove every key.
    fn clear(&self) -> Result<()>;

    /// Register for changes of `key`.
    fn subscribe(&self, key: &str) -> Result<Subscription>;

    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.write_batch(vec![(key.to_string(), Some(value))])
    }

    /// Delete `key`; removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()> {
        self.write_batch(vec![(key.to_string(), None)])
    }
}

/// Typed access on top of [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Decode the value under `key`; `null` reads as absent.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    /// Encode `value` and store it under `key`.
    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set(key, serde_json::to_value(value)?)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Live registration returned by [`KeyValueStore::subscribe`].
///
/// Changes arrive on [`Subscription::receiver`]. Dropping the subscription
/// or calling [`Subscription::unsubscribe`] stops delivery.
pub struct Subscription {
    id: u64,
    key: String,
    receiver: Receiver<StorageChange>,
    hub: Weak<ChangeHub>,
}

impl Subscription {
    /// Key this subscription listens to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Channel the changes are delivered on.
    pub fn receiver(&self) -> &Receiver<StorageChange> {
        &self.receiver
    }

    /// Stop receiving changes.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unregister(self.id);
        }
    }
}

struct Subscriber {
    id: u64,
    key: String,
    tx: Sender<StorageChange>,
}

/// Subscriber registry shared by all handles of one store.
#[derive(Default)]
struct ChangeHub {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl ChangeHub {
    fn register(self: &Arc<Self>, key: &str) -> Result<Subscription> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, receiver) = unbounded();
        self.subscribers.lock()?.push(Subscriber {
            id,
            key: key.to_string(),
            tx,
        });
        debug!("Subscriber {} registered for '{}'", id, key);
        Ok(Subscription {
            id,
            key: key.to_string(),
            receiver,
            hub: Arc::downgrade(self),
        })
    }

    fn unregister(&self, id: u64) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|s| s.id != id);
            debug!("Subscriber {} removed", id);
        }
    }

    fn publish(&self, changes: &[StorageChange]) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut subscribers = self.subscribers.lock()?;
        subscribers.retain(|subscriber| {
            changes
                .iter()
                .filter(|change| change.key == subscriber.key)
                .all(|change| match subscriber.tx.send(change.clone()) {
                    Ok(()) => true,
                    Err(_) => {
                        debug!("Dropping disconnected subscriber {}", subscriber.id);
                        false
                    }
                })
        });
        Ok(())
    }
}

/// Apply `entries` to `data`, returning the keys whose value actually changed.
fn apply_batch(data: &mut Snapshot, entries: Vec<(String, Option<Value>)>) -> Vec<StorageChange> {
    let mut changes = Vec::new();
    for (key, value) in entries {
        let old_value = match &value {
            Some(v) => data.insert(key.clone(), v.clone()),
            None => data.remove(&key),
        };
        if old_value != value {
            changes.push(StorageChange {
                key,
                old_value,
                new_value: value,
            });
        }
    }
    changes
}

/// Changes that turn `before` into `after`.
fn diff_snapshots(before: &Snapshot, after: &Snapshot) -> Vec<StorageChange> {
    let mut changes: Vec<StorageChange> = after
        .iter()
        .filter(|(key, value)| before.get(*key) != Some(*value))
        .map(|(key, value)| StorageChange {
            key: key.clone(),
            old_value: before.get(key).cloned(),
            new_value: Some(value.clone()),
        })
        .collect();
    changes.extend(
        before
            .iter()
            .filter(|(key, _)| !after.contains_key(*key))
            .map(|(key, value)| StorageChange {
                key: key.clone(),
                old_value: Some(value.clone()),
                new_value: None,
            }),
    );
    changes
}

/// In-process store; clones share data and subscribers.
///
/// Used in tests and by anything that needs a throwaway store. The backend can
/// be switched off with [`MemoryStore::set_available`] to exercise failure paths.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<Snapshot>>,
    available: Arc<AtomicBool>,
    hub: Arc<ChangeHub>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, available store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(Snapshot::new())),
            available: Arc::new(AtomicBool::new(true)),
            hub: Arc::new(ChangeHub::default()),
        }
    }

    /// Simulate the backend going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WatchlistError::StorageUnavailable(
                "memory store is offline".to_string(),
            ))
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.ensure_available()?;
        Ok(self.data.lock()?.get(key).cloned())
    }

    fn snapshot(&self) -> Result<Snapshot> {
        self.ensure_available()?;
        Ok(self.data.lock()?.clone())
    }

    fn write_batch(&self, entries: Vec<(String, Option<Value>)>) -> Result<()> {
        self.ensure_available()?;
        let changes = apply_batch(&mut *self.data.lock()?, entries);
        self.hub.publish(&changes)
    }

    fn clear(&self) -> Result<()> {
        self.ensure_available()?;
        let before = std::mem::take(&mut *self.data.lock()?);
        self.hub.publish(&diff_snapshots(&before, &Snapshot::new()))
    }

    fn subscribe(&self, key: &str) -> Result<Subscription> {
        self.hub.register(key)
    }
}

struct FileInner {
    path: PathBuf,
    /// Last document this process wrote or observed; guards file access too.
    last_seen: Mutex<Snapshot>,
    hub: Arc<ChangeHub>,
}

/// Store persisted as one JSON document on disk.
///
/// Writes go to a temporary sibling file that is then renamed over the
/// document, so readers never see a half-written file.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<FileInner>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let initial = read_document(&path)?;
        info!("File store opened at {} ({} keys)", path.display(), initial.len());
        Ok(Self {
            inner: Arc::new(FileInner {
                path,
                last_seen: Mutex::new(initial),
                hub: Arc::new(ChangeHub::default()),
            }),
        })
    }

    /// Location of the JSON document.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Poll the document every `interval` and notify subscribers about
    /// changes written by other processes.
    pub fn watch(&self, interval: Duration) -> Watcher {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let inner = self.inner.clone();
        info!(
            "Watching {} every {:?} for external changes",
            inner.path.display(),
            interval
        );
        let handle = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                thread::sleep(interval);
                if flag.load(Ordering::Relaxed) {
                    break;
                }
                if let Err(e) = inner.poll() {
                    error!("Polling {} failed: {}", inner.path.display(), e);
                }
            }
            debug!("Watcher for {} stopping...", inner.path.display());
        });
        Watcher {
            shutdown,
            handle: Some(handle),
        }
    }
}

impl FileInner {
    fn poll(&self) -> Result<()> {
        let changes = {
            let mut last_seen = self.last_seen.lock()?;
            let current = read_document(&self.path)?;
            let changes = diff_snapshots(&last_seen, &current);
            *last_seen = current;
            changes
        };
        if !changes.is_empty() {
            debug!("Detected {} external change(s)", changes.len());
        }
        self.hub.publish(&changes)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let _guard = self.inner.last_seen.lock()?;
        Ok(read_document(&self.inner.path)?.remove(key))
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let _guard = self.inner.last_seen.lock()?;
        read_document(&self.inner.path)
    }

    fn write_batch(&self, entries: Vec<(String, Option<Value>)>) -> Result<()> {
        let changes = {
            let mut last_seen = self.inner.last_seen.lock()?;
            let mut document = read_document(&self.inner.path)?;
            // Writes from other processes since the last poll are not ours to report here.
            let external = diff_snapshots(&last_seen, &document);
            let changes = apply_batch(&mut document, entries);
            if !changes.is_empty() {
                write_document(&self.inner.path, &document)?;
                debug!("Wrote {} key(s) to {}", changes.len(), self.inner.path.display());
            }
            *last_seen = document;
            external.into_iter().chain(changes).collect::<Vec<_>>()
        };
        self.inner.hub.publish(&changes)
    }

    fn clear(&self) -> Result<()> {
        let changes = {
            let mut last_seen = self.inner.last_seen.lock()?;
            let document = read_document(&self.inner.path)?;
            write_document(&self.inner.path, &Snapshot::new())?;
            let changes = diff_snapshots(&document, &Snapshot::new());
            let external = diff_snapshots(&last_seen, &document);
            *last_seen = Snapshot::new();
            external.into_iter().chain(changes).collect::<Vec<_>>()
        };
        self.inner.hub.publish(&changes)
    }

    fn subscribe(&self, key: &str) -> Result<Subscription> {
        self.inner.hub.register(key)
    }
}

/// Background poller started by [`FileStore::watch`]; stops when dropped.
pub struct Watcher {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Watcher {
    /// Signal the polling thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Watcher thread panicked");
            }
        }
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> WatchlistError {
    WatchlistError::StorageUnavailable(format!("{}: {}", path.display(), err))
}

fn read_document(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::new());
    }
    let text = fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
    if text.trim().is_empty() {
        return Ok(Snapshot::new());
    }
    Ok(serde_json::from_str(&text)?)
}

fn write_document(path: &Path, document: &Snapshot) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let bytes = serde_json::to_vec_pretty(document)?;
    fs::write(&tmp, bytes).map_err(|e| unavailable(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| unavailable(path, e))
}
