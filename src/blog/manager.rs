use crate::blog::audit;
use crate::blog::content;
use crate::blog::index::{FileIndexStore, Index, IndexStore, Log, LogDraft};
use crate::blog::lock::ArchiveLock;
use crate::blog::paths::BlogPaths;
use crate::blog::util::publish_stamp;
use crate::blog::warn::{self, WarnEvent};
use crate::error::ArchiveError;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};

/// Sent to subscribers after every successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub position: usize,
    pub title: String,
}

/// A log plus its content with asset references already rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub position: usize,
    pub log: Log,
    pub content: String,
}

/// Owns the loaded index of one archive and every write made to it.
///
/// Rows count newest first (row 0 is the latest entry); positions count in
/// creation order and name the content subdirectories.
#[derive(Debug)]
pub struct BlogManager {
    paths: BlogPaths,
    store: Box<dyn IndexStore>,
    index: Index,
    subscribers: Vec<Sender<Published>>,
}

impl BlogManager {
    pub fn open(paths: BlogPaths) -> Result<Self, ArchiveError> {
        let store = FileIndexStore::new(paths.index_path.clone());
        Self::open_with_store(paths, Box::new(store))
    }

    pub fn open_with_store(
        paths: BlogPaths,
        store: Box<dyn IndexStore>,
    ) -> Result<Self, ArchiveError> {
        let index = store.load()?;
        Ok(Self {
            paths,
            store,
            index,
            subscribers: Vec::new(),
        })
    }

    pub fn basedir(&self) -> &Path {
        &self.paths.basedir
    }

    pub fn index_path(&self) -> &Path {
        self.store.path()
    }

    pub fn len(&self) -> usize {
        self.index.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.logs.is_empty()
    }

    /// Logs in creation order.
    pub fn logs(&self) -> &[Log] {
        &self.index.logs
    }

    pub fn subscribe(&mut self) -> Receiver<Published> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, event: Published) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Re-read the index while holding the writer lock.
    ///
    /// Entries another writer appended since our last read are adopted and
    /// announced. If disk is a prefix of memory (an earlier save failed) the
    /// in-memory logs win so the next save persists them. Any other
    /// divergence is `StaleIndex` and leaves memory untouched.
    fn refresh(&mut self) -> Result<(), ArchiveError> {
        let on_disk = self.store.load()?;
        let held = self.index.logs.len();

        if on_disk.logs.starts_with(&self.index.logs) {
            let adopted: Vec<Published> = on_disk.logs[held..]
                .iter()
                .enumerate()
                .map(|(offset, log)| Published {
                    position: held + offset,
                    title: log.title.clone(),
                })
                .collect();
            self.index = on_disk;
            for event in adopted {
                self.notify(event);
            }
            return Ok(());
        }
        if self.index.logs.starts_with(&on_disk.logs) {
            return Ok(());
        }

        warn::emit(WarnEvent {
            code: "STALE_INDEX",
            stage: "refresh",
            action: "reload-index",
            position: None,
            path: &self.store.path().display().to_string(),
            reason: "index-diverged",
            err: &format!("memory={held} disk={}", on_disk.logs.len()),
        });
        Err(ArchiveError::StaleIndex {
            path: self.store.path().to_path_buf(),
            memory: held,
            disk: on_disk.logs.len(),
        })
    }

    /// Append metadata for content that is already on disk.
    ///
    /// A failed save leaves the new log in memory but not on disk; the error
    /// is returned and no notification is sent.
    pub fn append(&mut self, draft: LogDraft) -> Result<usize, ArchiveError> {
        draft.validate()?;
        let _lock = ArchiveLock::acquire(&self.paths.lock_path)?;
        self.refresh()?;

        let position = self.index.logs.len();
        let log = draft.stamp(publish_stamp());
        let title = log.title.clone();
        self.index.logs.push(log);

        if let Err(err) = self.store.save(&self.index) {
            audit::record(
                &self.paths,
                "append",
                "failed",
                &format!("position={position} in-memory index ahead of disk: {err}"),
            );
            return Err(err);
        }

        audit::record(
            &self.paths,
            "append",
            "ok",
            &format!("position={position} title={title}"),
        );
        self.notify(Published { position, title });
        Ok(position)
    }

    /// Write the content file for the next position, then append its metadata.
    ///
    /// If the index cannot be saved the content write and the in-memory
    /// append are both undone.
    pub fn publish(&mut self, draft: LogDraft, body: &str) -> Result<usize, ArchiveError> {
        draft.validate()?;
        let _lock = ArchiveLock::acquire(&self.paths.lock_path)?;
        self.refresh()?;

        let position = self.index.logs.len();
        let written = content::write_content(&self.paths.basedir, position, body).map_err(
            |err| ArchiveError::WriteFailure {
                path: content::content_path(&self.paths.basedir, position),
                reason: err.to_string(),
            },
        )?;

        let log = draft.stamp(publish_stamp());
        let title = log.title.clone();
        self.index.logs.push(log);

        if let Err(err) = self.store.save(&self.index) {
            self.index.logs.pop();
            let content_path = written.path.display().to_string();
            if let Err(rollback_err) = written.rollback() {
                warn::emit(WarnEvent {
                    code: "CONTENT_ROLLBACK_FAILED",
                    stage: "publish",
                    action: "rollback-content",
                    position: Some(position),
                    path: &content_path,
                    reason: "index-save-failed",
                    err: &rollback_err.to_string(),
                });
            }
            audit::record(
                &self.paths,
                "publish",
                "rolled-back",
                &format!("position={position}: {err}"),
            );
            return Err(err);
        }

        audit::record(
            &self.paths,
            "publish",
            "ok",
            &format!("position={position} title={title}"),
        );
        self.notify(Published { position, title });
        Ok(position)
    }

    pub fn display_index_from_row(&self, row: i64) -> Result<usize, ArchiveError> {
        let len = self.len();
        if row < 0 || row >= len as i64 {
            return Err(ArchiveError::OutOfRange {
                requested: row,
                len,
            });
        }
        Ok(len - 1 - row as usize)
    }

    fn checked_position(&self, position: i64) -> Result<usize, ArchiveError> {
        let len = self.len();
        if position < 0 || position >= len as i64 {
            return Err(ArchiveError::OutOfRange {
                requested: position,
                len,
            });
        }
        Ok(position as usize)
    }

    pub fn resolve_entry(&self, position: i64) -> Result<ResolvedEntry, ArchiveError> {
        let position = self.checked_position(position)?;
        let log = self.index.logs[position].clone();
        let content = content::read_rewritten(&self.paths.basedir, position)?;
        Ok(ResolvedEntry {
            position,
            log,
            content,
        })
    }

    /// Titles newest first, matching row numbering.
    pub fn titles(&self) -> Vec<String> {
        self.index
            .logs
            .iter()
            .rev()
            .map(|log| log.title.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::index;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    /// Reads the real index but refuses every save.
    #[derive(Debug)]
    struct ReadOnlyStore(FileIndexStore);

    impl IndexStore for ReadOnlyStore {
        fn path(&self) -> &Path {
            self.0.path()
        }

        fn load(&self) -> Result<Index, ArchiveError> {
            self.0.load()
        }

        fn save(&self, _index: &Index) -> Result<(), ArchiveError> {
            Err(ArchiveError::WriteFailure {
                path: self.0.path().to_path_buf(),
                reason: "read-only store".to_string(),
            })
        }
    }

    fn read_only(tmp: &TempDir) -> Box<dyn IndexStore> {
        Box::new(ReadOnlyStore(FileIndexStore::new(tmp.path().join("index.json"))))
    }

    fn seeded(index_json: &str) -> (TempDir, BlogManager) {
        let tmp = tempdir().expect("tempdir");
        let index_path = tmp.path().join("index.json");
        fs::write(&index_path, index_json).expect("write index");
        let paths = BlogPaths::for_index(index_path, None, true);
        let manager = BlogManager::open(paths).expect("open");
        (tmp, manager)
    }

    fn write_body(root: &Path, position: usize, body: &str) {
        let dir = root.join(position.to_string());
        fs::create_dir_all(&dir).expect("mkdir");
        fs::write(dir.join("content.md"), body).expect("write content");
    }

    #[test]
    fn single_entry_row_zero_resolves_to_position_zero() {
        let (tmp, manager) =
            seeded(r#"{"logs":[{"title":"A","topics":["x"],"publishTime":100}]}"#);
        write_body(tmp.path(), 0, "hello file:pic.png");

        let position = manager.display_index_from_row(0).expect("row");
        assert_eq!(position, 0);
        let entry = manager.resolve_entry(position as i64).expect("resolve");
        assert_eq!(entry.log.title, "A");
        assert_eq!(entry.log.topics, vec!["x".to_string()]);
        assert_eq!(entry.log.publish_time, 100);
        assert_eq!(
            entry.content,
            format!("hello file:{}/0/pic.png\n", tmp.path().display())
        );
    }

    #[test]
    fn every_row_resolves_to_the_title_listed_at_that_row() {
        let (tmp, manager) = seeded(
            r#"{"logs":[
                {"title":"first","topics":[],"publishTime":1},
                {"title":"second","topics":[],"publishTime":2},
                {"title":"third","topics":[],"publishTime":3}
            ]}"#,
        );
        for position in 0..3 {
            write_body(tmp.path(), position, &format!("body {position}"));
        }

        let titles = manager.titles();
        assert_eq!(titles, vec!["third", "second", "first"]);
        for (row, title) in titles.iter().enumerate() {
            let position = manager.display_index_from_row(row as i64).expect("row");
            let entry = manager.resolve_entry(position as i64).expect("resolve");
            assert_eq!(&entry.log.title, title);
            assert_eq!(entry.content, format!("body {position}\n"));
        }
    }

    #[test]
    fn out_of_range_rows_and_positions_fail() {
        let (_tmp, manager) = seeded(
            r#"{"logs":[{"title":"a","topics":[],"publishTime":1},{"title":"b","topics":[],"publishTime":2}]}"#,
        );

        for bad in [-1, 2] {
            assert!(matches!(
                manager.resolve_entry(bad),
                Err(ArchiveError::OutOfRange { requested, len: 2 }) if requested == bad
            ));
            assert!(matches!(
                manager.display_index_from_row(bad),
                Err(ArchiveError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn missing_content_only_affects_that_entry() {
        let (tmp, manager) = seeded(
            r#"{"logs":[{"title":"a","topics":[],"publishTime":1},{"title":"b","topics":[],"publishTime":2}]}"#,
        );
        write_body(tmp.path(), 1, "still here");

        assert!(matches!(
            manager.resolve_entry(0),
            Err(ArchiveError::ContentMissing { position: 0, .. })
        ));
        assert_eq!(manager.resolve_entry(1).expect("resolve").content, "still here\n");
    }

    #[test]
    fn append_is_monotonic_and_newest_first() {
        let (tmp, mut manager) =
            seeded(r#"{"logs":[{"title":"old","topics":[],"publishTime":5}]}"#);
        let before = manager.len();

        let position = manager
            .append(LogDraft::new("new", vec!["rust".to_string()]))
            .expect("append");

        assert_eq!(position, before);
        assert_eq!(manager.len(), before + 1);
        assert_eq!(manager.titles()[0], "new");
        assert!(manager.logs()[position].publish_time > 0);

        let reloaded = index::load(&tmp.path().join("index.json")).expect("reload");
        assert_eq!(reloaded.logs, manager.logs());
    }

    #[test]
    fn append_notifies_live_subscribers() {
        let (_tmp, mut manager) = seeded(r#"{"logs":[]}"#);
        let rx = manager.subscribe();
        let dropped = manager.subscribe();
        drop(dropped);

        manager.append(LogDraft::new("one", vec![])).expect("append");

        assert_eq!(
            rx.try_recv().expect("event"),
            Published {
                position: 0,
                title: "one".to_string()
            }
        );
        assert_eq!(manager.subscribers.len(), 1);
    }

    #[test]
    fn failed_append_keeps_memory_ahead_of_disk() {
        let (tmp, mut manager) = seeded(r#"{"logs":[]}"#);
        let rx = manager.subscribe();
        manager.store = read_only(&tmp);

        let err = manager
            .append(LogDraft::new("lost", vec![]))
            .expect_err("save must fail");
        assert!(matches!(err, ArchiveError::WriteFailure { .. }));
        assert_eq!(manager.len(), 1);
        assert!(rx.try_recv().is_err());
        assert!(index::load(&tmp.path().join("index.json")).expect("load").logs.is_empty());
    }

    #[test]
    fn retry_after_failed_save_persists_the_held_entry() {
        let (tmp, mut manager) = seeded(r#"{"logs":[]}"#);
        manager.store = read_only(&tmp);
        manager
            .append(LogDraft::new("held", vec![]))
            .expect_err("save must fail");

        manager.store = Box::new(FileIndexStore::new(tmp.path().join("index.json")));
        let position = manager.append(LogDraft::new("next", vec![])).expect("append");

        assert_eq!(position, 1);
        let on_disk = index::load(&tmp.path().join("index.json")).expect("load");
        let titles: Vec<&str> = on_disk.logs.iter().map(|log| log.title.as_str()).collect();
        assert_eq!(titles, vec!["held", "next"]);
    }

    #[test]
    fn publish_writes_content_before_metadata() {
        let (tmp, mut manager) = seeded(r#"{"logs":[]}"#);

        let position = manager
            .publish(LogDraft::new("post", vec![]), "![x](file:x.png)")
            .expect("publish");

        assert_eq!(position, 0);
        let entry = manager.resolve_entry(0).expect("resolve");
        assert_eq!(
            entry.content,
            format!("![x](file:{}/0/x.png)\n", tmp.path().display())
        );
    }

    #[test]
    fn failed_publish_rolls_back_content_and_memory() {
        let (tmp, mut manager) = seeded(r#"{"logs":[]}"#);
        manager.store = read_only(&tmp);

        let err = manager
            .publish(LogDraft::new("post", vec![]), "body")
            .expect_err("save must fail");

        assert!(matches!(err, ArchiveError::WriteFailure { .. }));
        assert!(manager.is_empty());
        assert!(!tmp.path().join("0").exists());
    }

    #[test]
    fn two_managers_on_one_archive_keep_both_entries() {
        let (tmp, mut a) = seeded(r#"{"logs":[]}"#);
        let paths = BlogPaths::for_index(tmp.path().join("index.json"), None, true);
        let mut b = BlogManager::open(paths).expect("open second");
        let b_events = b.subscribe();

        assert_eq!(
            a.publish(LogDraft::new("from-a", vec![]), "A body")
                .expect("publish a"),
            0
        );
        assert_eq!(
            b.publish(LogDraft::new("from-b", vec![]), "B body")
                .expect("publish b"),
            1
        );

        let on_disk = index::load(&tmp.path().join("index.json")).expect("load");
        let titles: Vec<&str> = on_disk.logs.iter().map(|log| log.title.as_str()).collect();
        assert_eq!(titles, vec!["from-a", "from-b"]);
        assert_eq!(
            content::read_raw(tmp.path(), 0).expect("content 0"),
            "A body"
        );
        assert_eq!(
            content::read_raw(tmp.path(), 1).expect("content 1"),
            "B body"
        );
        assert_eq!(b.titles(), vec!["from-b", "from-a"]);

        let seen: Vec<usize> = b_events.try_iter().map(|event| event.position).collect();
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn diverged_index_is_stale_and_mutates_nothing() {
        let (tmp, mut a) = seeded(r#"{"logs":[]}"#);
        let paths = BlogPaths::for_index(tmp.path().join("index.json"), None, true);
        let mut b = BlogManager::open(paths).expect("open second");

        b.store = read_only(&tmp);
        b.append(LogDraft::new("unsaved", vec![]))
            .expect_err("save must fail");
        b.store = Box::new(FileIndexStore::new(tmp.path().join("index.json")));
        a.publish(LogDraft::new("saved", vec![]), "body")
            .expect("publish a");

        let err = b
            .publish(LogDraft::new("late", vec![]), "late body")
            .expect_err("stale");
        assert!(matches!(
            err,
            ArchiveError::StaleIndex {
                memory: 1,
                disk: 1,
                ..
            }
        ));
        assert_eq!(b.titles(), vec!["unsaved"]);
        assert!(!tmp.path().join("1").exists());
        assert_eq!(index::load(&tmp.path().join("index.json")).expect("load").logs.len(), 1);
    }

    #[test]
    fn concurrent_writer_is_locked_out() {
        let (_tmp, mut manager) = seeded(r#"{"logs":[]}"#);
        let _held = ArchiveLock::acquire(&manager.paths.lock_path).expect("lock");

        let err = manager
            .append(LogDraft::new("blocked", vec![]))
            .expect_err("locked");
        assert!(matches!(err, ArchiveError::Locked { .. }));
        assert!(manager.is_empty());
    }

    #[test]
    fn append_is_recorded_in_audit_log() {
        let (_tmp, mut manager) = seeded(r#"{"logs":[]}"#);
        manager.append(LogDraft::new("audited", vec![])).expect("append");

        let events = audit::read_events(&manager.paths).expect("events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, "append");
        assert_eq!(events[0].status, "ok");
    }

    #[test]
    fn corrupt_index_refuses_to_open() {
        let tmp = tempdir().expect("tempdir");
        let index_path = tmp.path().join("index.json");
        fs::write(&index_path, "not json").expect("write");

        let err = BlogManager::open(BlogPaths::for_index(index_path, None, false))
            .expect_err("corrupt");
        assert!(matches!(err, ArchiveError::CorruptIndex { .. }));
    }
}
