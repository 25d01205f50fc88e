use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use thiserror::Error as ThisError;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::store::{State, Store};

#[derive(Debug, ThisError)]
pub enum PersistenceError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(bincode::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(bincode::Error),
}

/// Writes full snapshots of the store to disk and restores them at startup.
///
/// Saves go through `<path>.tmp` and a rename, so the file at `path` is always either the previous
/// complete snapshot or the new one. Saves never overlap: SAVE, SHUTDOWN and the background saver
/// take turns on the temporary file.
pub struct Persistence {
    store: Store,
    path: PathBuf,
    // Held for the whole of a save, from encoding to rename.
    saving: Mutex<()>,
    dirty: AtomicBool,
    // Unix seconds of the last successful save, 0 when none happened yet.
    last_save: AtomicU64,
    waker: Notify,
}

impl Persistence {
    pub fn new(store: Store, path: impl Into<PathBuf>) -> Persistence {
        Persistence {
            store,
            path: path.into(),
            saving: Mutex::new(()),
            dirty: AtomicBool::new(false),
            last_save: AtomicU64::new(0),
            waker: Notify::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Marks the store dirty and wakes the background saver right away.
    pub fn request_save(&self) {
        self.mark_dirty();
        self.waker.notify_one();
    }

    pub fn last_save(&self) -> u64 {
        self.last_save.load(Ordering::Acquire)
    }

    /// Serializes the whole store and atomically replaces the snapshot file.
    ///
    /// The store is only read-locked while it is being encoded, file I/O happens after the lock
    /// is released. On failure the temporary file is removed and the previous snapshot stays.
    /// A save started while another one runs waits for it, then writes a fresh image.
    pub fn save(&self) -> Result<(), PersistenceError> {
        let _saving = self.saving.lock();

        let encoded = {
            let state = self.store.read();
            bincode::serialize(&*state).map_err(PersistenceError::Encode)?
        };

        let tmp = self.tmp_path();
        if let Err(e) = write_and_rename(&tmp, &self.path, &encoded) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.last_save.store(now, Ordering::Release);

        debug!(path = %self.path.display(), bytes = encoded.len(), "snapshot saved");
        Ok(())
    }

    /// [`Persistence::save`] for callers running on a runtime worker, like the SAVE and SHUTDOWN
    /// commands. On a multi-threaded runtime the worker hands its other tasks off while the file
    /// is written. A current-thread runtime has nowhere to move them, so the save runs inline.
    pub fn save_in_place(&self) -> Result<(), PersistenceError> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.save())
            }
            _ => self.save(),
        }
    }

    /// Replaces the store content with the snapshot on disk.
    pub fn load(&self) -> Result<(), PersistenceError> {
        let file = File::open(&self.path)?;
        let snapshot: State = bincode::deserialize_from(BufReader::new(file))
            .map_err(PersistenceError::Decode)?;

        let keys = snapshot.size();
        self.store.write().replace(snapshot);

        info!(path = %self.path.display(), keys, "snapshot loaded");
        Ok(())
    }

    /// Loads the snapshot at startup. A missing or unreadable file leaves the store empty.
    pub fn restore(&self) {
        match self.load() {
            Ok(()) => {}
            Err(PersistenceError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no snapshot found, starting empty");
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load snapshot, starting empty");
            }
        }
    }
}

fn write_and_rename(tmp: &Path, path: &Path, encoded: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(tmp)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(encoded)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp, path)
}

/// Saves the store whenever it is dirty, checking every `interval` or as soon as a save is
/// requested.
pub async fn run_background_save(persistence: Arc<Persistence>, interval: Duration) {
    info!(
        path = %persistence.path.display(),
        interval_ms = interval.as_millis() as u64,
        "background save task started"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = persistence.waker.notified() => {}
        }

        if !persistence.dirty.swap(false, Ordering::AcqRel) {
            continue;
        }

        let task = {
            let persistence = persistence.clone();
            tokio::task::spawn_blocking(move || persistence.save())
        };

        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "background save failed");
                persistence.mark_dirty();
            }
            Err(e) => {
                error!(error = %e, "background save task panicked");
                persistence.mark_dirty();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn populated_store() -> Store {
        let store = Store::new();
        {
            let mut state = store.write();
            state.set("greeting".to_string(), Bytes::from("hello"));
            state.expire("greeting", Duration::from_secs(3600));
            state.rpush("list", vec![Bytes::from("a"), Bytes::from("b")]);
            state.hset("hash", "field".to_string(), Bytes::from("value"));
            state.sadd("set", vec!["x".to_string(), "y".to_string()]);
            state.zadd("zset", vec![(1.0, "one".to_string()), (2.0, "two".to_string())]);
            // Same key in another namespace.
            state.rpush("greeting", vec![Bytes::from("again")]);
        }
        store
    }

    #[test]
    fn save_then_load_into_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.kvdis");

        let store = populated_store();
        Persistence::new(store.clone(), &path).save().unwrap();

        let fresh = Store::new();
        Persistence::new(fresh.clone(), &path).load().unwrap();

        assert_eq!(*fresh.read(), *store.read());
        assert!(!dir.path().join("dump.kvdis.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = Persistence::new(Store::new(), dir.path().join("missing"));

        let err = persistence.load().unwrap_err();

        assert!(matches!(err, PersistenceError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
        persistence.restore();
        assert_eq!(persistence.store.read().size(), 0);
    }

    #[test]
    fn load_corrupt_file_keeps_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.kvdis");
        fs::write(&path, b"definitely not a snapshot").unwrap();

        let store = Store::new();
        store.write().set("k".to_string(), Bytes::from("v"));
        let persistence = Persistence::new(store.clone(), &path);

        assert!(matches!(persistence.load(), Err(PersistenceError::Decode(_))));
        persistence.restore();
        assert_eq!(store.read().get("k"), Some(&Bytes::from("v")));
    }

    #[test]
    fn failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.kvdis");

        let store = populated_store();
        let persistence = Persistence::new(store.clone(), &path);
        persistence.save().unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temporary path makes the next save fail.
        fs::create_dir(dir.path().join("dump.kvdis.tmp")).unwrap();
        store.write().set("new".to_string(), Bytes::from("value"));

        assert!(persistence.save().is_err());
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn concurrent_saves_do_not_interfere() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.kvdis");

        let store = populated_store();
        let persistence = Persistence::new(store.clone(), &path);

        for round in 0..200 {
            store
                .write()
                .set(format!("key{}", round), Bytes::from(round.to_string()));

            let (first, second) = std::thread::scope(|s| {
                let first = s.spawn(|| persistence.save());
                let second = s.spawn(|| persistence.save());
                (first.join().unwrap(), second.join().unwrap())
            });

            assert!(first.is_ok(), "round {}: {:?}", round, first);
            assert!(second.is_ok(), "round {}: {:?}", round, second);
        }

        let fresh = Store::new();
        Persistence::new(fresh.clone(), &path).load().unwrap();
        assert_eq!(*fresh.read(), *store.read());
        assert!(!dir.path().join("dump.kvdis.tmp").exists());
    }

    #[tokio::test]
    async fn background_save_runs_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.kvdis");

        let store = populated_store();
        let persistence = Arc::new(Persistence::new(store, &path));
        tokio::spawn(run_background_save(
            persistence.clone(),
            Duration::from_secs(3600),
        ));

        persistence.request_save();

        for _ in 0..100 {
            if persistence.last_save() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(path.exists());
        assert!(!persistence.is_dirty());
        assert!(persistence.last_save() > 0);
    }
}
