// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bounded, concurrency-safe record store

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

use super::query::{export_text, Statistics};
use crate::error::Result;
use crate::logger::ConfigHandle;
use crate::network::{LogKind, LogRecord, RecordId};

/// Capacity of the change notification channel
const CHANGE_CHANNEL_CAPACITY: usize = 64;

type Records = VecDeque<LogRecord>;
type ReadFn = Box<dyn FnOnce(&Records) + Send>;

/// Payload-less "store changed" notification
///
/// Subscribers re-query the store after receiving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChanged;

/// Completion signal of a submitted write
///
/// The write is queued as soon as the mutating call returns; awaiting the
/// completion is optional. Resolves to `true` when the write changed the
/// store (an update or remove of a missing id resolves to `false`).
///
/// Every write that changed the store sends a [`StoreChanged`]; a remove
/// sends one whether or not the id was found.
#[derive(Debug)]
pub struct Completion(oneshot::Receiver<bool>);

impl Future for Completion {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.0).poll(cx).map(|r| r.unwrap_or(false))
    }
}

enum Write {
    Insert(LogRecord),
    Update(LogRecord),
    Remove(RecordId),
    Clear,
}

enum Command {
    Write(Write, oneshot::Sender<bool>),
    Read(ReadFn),
}

/// The record store
///
/// Records are kept newest first and bounded by the configured
/// `max_records`. Writes are applied one at a time in submission order by a
/// background task. Reads are queued behind every write submitted before
/// them and run concurrently with each other.
///
/// Cloning the store yields another handle to the same records. The
/// background task ends once every handle is dropped. A store must be
/// created from within a Tokio runtime.
#[derive(Clone)]
pub struct LogStore {
    commands: mpsc::UnboundedSender<Command>,
    changes: broadcast::Sender<StoreChanged>,
}

impl LogStore {
    /// Create an empty store bounded by `config.max_records`
    pub fn new(config: ConfigHandle) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let worker = Worker {
            records: Arc::new(RwLock::new(VecDeque::new())),
            config,
            changes: changes.clone(),
        };
        tokio::spawn(worker.run(rx));

        Self { commands, changes }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
        self.changes.subscribe()
    }

    /// Prepend a record, evicting the oldest beyond capacity
    pub fn insert(&self, record: LogRecord) -> Completion {
        self.submit(Write::Insert(record))
    }

    /// Replace the record with the same id, keeping its position
    pub fn update(&self, record: LogRecord) -> Completion {
        self.submit(Write::Update(record))
    }

    /// Remove a record by id
    pub fn remove(&self, id: RecordId) -> Completion {
        self.submit(Write::Remove(id))
    }

    /// Remove every record
    pub fn clear(&self) -> Completion {
        self.submit(Write::Clear)
    }

    /// Get a record by id
    pub async fn get(&self, id: RecordId) -> Option<LogRecord> {
        self.query(move |records| records.iter().find(|r| r.id() == id).cloned())
            .await
    }

    /// All records, newest first
    pub async fn get_all(&self) -> Vec<LogRecord> {
        self.query(|records| records.iter().cloned().collect()).await
    }

    /// Number of records held
    pub async fn count(&self) -> usize {
        self.query(|records| records.len()).await
    }

    /// Records matching a keyword (case-insensitive) in url, method or bodies
    pub async fn search(&self, keyword: impl Into<String>) -> Vec<LogRecord> {
        let keyword = keyword.into();
        self.filtered(move |r| r.matches_keyword(&keyword)).await
    }

    /// Records of one kind
    pub async fn filter_by_kind(&self, kind: LogKind) -> Vec<LogRecord> {
        self.filtered(move |r| r.kind() == kind).await
    }

    /// Records with a given status code
    pub async fn filter_by_status(&self, status: u16) -> Vec<LogRecord> {
        self.filtered(move |r| r.status_code == Some(status)).await
    }

    /// Records that did not succeed or carry an error
    pub async fn get_failed(&self) -> Vec<LogRecord> {
        self.filtered(|r| !r.is_success() || r.error.is_some()).await
    }

    /// Aggregate statistics
    pub async fn statistics(&self) -> Statistics {
        self.query(|records| Statistics::from_records(records)).await
    }

    /// Text export of all records, or of the given ids only
    pub async fn export_as_text(&self, ids: Option<Vec<RecordId>>) -> String {
        self.query(move |records| export_text(records, ids.as_deref()))
            .await
    }

    /// Text export of a single record
    pub async fn export_record(&self, id: RecordId) -> Option<String> {
        self.query(move |records| {
            records
                .iter()
                .find(|r| r.id() == id)
                .map(LogRecord::to_log_text)
        })
        .await
    }

    /// JSON array of all records, newest first
    pub async fn export_as_json(&self) -> Result<String> {
        let records = self.get_all().await;
        Ok(serde_json::to_string_pretty(&records)?)
    }

    fn submit(&self, write: Write) -> Completion {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Write(write, tx)).is_err() {
            tracing::debug!("Store worker is gone, dropping write");
        }
        Completion(rx)
    }

    async fn filtered<F>(&self, predicate: F) -> Vec<LogRecord>
    where
        F: Fn(&LogRecord) -> bool + Send + 'static,
    {
        self.query(move |records| records.iter().filter(|r| predicate(r)).cloned().collect())
            .await
    }

    /// Run a read against the records; `T::default()` if the worker is gone
    async fn query<T, F>(&self, f: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&Records) -> T + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let read: ReadFn = Box::new(move |records: &Records| {
            let _ = tx.send(f(records));
        });
        if self.commands.send(Command::Read(read)).is_err() {
            return T::default();
        }
        rx.await.unwrap_or_default()
    }
}

struct Worker {
    records: Arc<RwLock<Records>>,
    config: ConfigHandle,
    changes: broadcast::Sender<StoreChanged>,
}

impl Worker {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Read(read) => {
                    // Taken in queue order, so the read sees every earlier write.
                    let guard = self.records.clone().read_owned().await;
                    tokio::spawn(async move { read(&*guard) });
                }
                Command::Write(write, reply) => {
                    // Removals notify even when the id was already gone
                    let always_notify = matches!(write, Write::Remove(_));
                    let changed = self.apply(write).await;
                    if changed || always_notify {
                        // No receivers is fine
                        let _ = self.changes.send(StoreChanged);
                    }
                    let _ = reply.send(changed);
                }
            }
        }
        tracing::debug!("Store worker stopped");
    }

    async fn apply(&self, write: Write) -> bool {
        let mut records = self.records.write().await;
        match write {
            Write::Insert(record) => {
                let (max_records, echo) = self.config.read(|c| (c.max_records, c.print_to_console));
                if echo {
                    tracing::info!("\n{}", record.to_log_text());
                }
                tracing::debug!(id = %record.id(), url = record.url(), "Record inserted");
                records.push_front(record);
                records.truncate(max_records.max(1));
                true
            }
            Write::Update(record) => {
                match records.iter_mut().find(|r| r.id() == record.id()) {
                    Some(slot) => {
                        *slot = record;
                        true
                    }
                    None => {
                        tracing::debug!(id = %record.id(), "Update for evicted or unknown record ignored");
                        false
                    }
                }
            }
            Write::Remove(id) => {
                let before = records.len();
                records.retain(|r| r.id() != id);
                records.len() != before
            }
            Write::Clear => {
                records.clear();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Config;
    use crate::network::HttpMethod;
    use bytes::Bytes;
    use proptest::prelude::*;

    fn store_with_capacity(max: usize) -> LogStore {
        LogStore::new(ConfigHandle::new(Config::default().max_records(max)))
    }

    fn record(url: &str) -> LogRecord {
        LogRecord::new(LogKind::from_url(url), url, Some(HttpMethod::Get))
    }

    #[tokio::test]
    async fn test_capacity_keeps_newest_first() {
        let store = store_with_capacity(3);
        let records: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|name| record(&format!("http://x.test/{}", name)))
            .collect();
        for r in &records {
            store.insert(r.clone());
        }

        let ids: Vec<_> = store.get_all().await.iter().map(LogRecord::id).collect();
        assert_eq!(ids, vec![records[4].id(), records[3].id(), records[2].id()]);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_not_lost() {
        let store = store_with_capacity(10);
        let (a, b) = (store.clone(), store.clone());

        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.insert(record("http://x.test/1")).await }),
            tokio::spawn(async move { b.insert(record("http://x.test/2")).await }),
        );
        assert!(ra.unwrap() && rb.unwrap());
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let store = store_with_capacity(10);
        let first = record("http://x.test/1");
        let mut second = record("http://x.test/2");
        store.insert(first.clone());
        store.insert(second.clone());

        second.status_code = Some(204);
        assert!(store.update(second.clone()).await);

        let all = store.get_all().await;
        assert_eq!(all[0], second);
        assert_eq!(all[1], first);
    }

    #[tokio::test]
    async fn test_update_miss_is_noop() {
        let store = store_with_capacity(10);
        store.insert(record("http://x.test/1"));

        assert!(!store.update(record("http://x.test/ghost")).await);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn test_read_observes_earlier_writes() {
        let store = store_with_capacity(10);
        let r = record("http://x.test/1");
        // Not awaited: the read is still ordered after it
        store.insert(r.clone());
        assert_eq!(store.get(r.id()).await, Some(r));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = store_with_capacity(10);
        let a = record("http://x.test/a");
        let b = record("http://x.test/b");
        store.insert(a.clone());
        store.insert(b.clone());

        assert!(store.remove(a.id()).await);
        assert!(!store.remove(a.id()).await);
        assert_eq!(store.get(a.id()).await, None);

        store.clear().await;
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_change_notifications() {
        let store = store_with_capacity(10);
        let mut changes = store.subscribe();
        let r = record("http://x.test/a");

        store.insert(r.clone()).await;
        assert_eq!(changes.recv().await.unwrap(), StoreChanged);

        store.update(record("http://x.test/ghost")).await;
        store.clear().await;
        assert_eq!(changes.recv().await.unwrap(), StoreChanged);
        assert!(changes.try_recv().is_err());

        assert!(!store.remove(r.id()).await);
        assert_eq!(changes.try_recv().unwrap(), StoreChanged);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_queries() {
        let store = store_with_capacity(10);

        let mut ok = record("https://api.test/users");
        ok.status_code = Some(200);
        ok.response_body = Some(Bytes::from("Alice"));
        let mut missing = record("http://cdn.test/logo.png");
        missing.status_code = Some(404);
        let mut broken = record("https://api.test/orders");
        broken.error = Some("connection reset".into());
        broken.request_body = Some(Bytes::from("{\"coupon\":\"Spring\"}"));

        for r in [&ok, &missing, &broken] {
            store.insert(r.clone());
        }

        assert_eq!(store.search("ALICE").await, vec![ok.clone()]);
        assert_eq!(store.search("sPRING").await, vec![broken.clone()]);
        assert_eq!(store.filter_by_kind(LogKind::Http).await, vec![missing.clone()]);
        assert_eq!(store.filter_by_status(404).await, vec![missing.clone()]);
        assert_eq!(store.get_failed().await, vec![broken.clone(), missing.clone()]);

        let stats = store.statistics().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.success, 1);
        assert_eq!(stats.total_bytes, 5);
        assert_eq!(stats.count_of(LogKind::Https), 2);
    }

    #[tokio::test]
    async fn test_export_contains_each_id_once() {
        let store = store_with_capacity(10);
        let records: Vec<_> = (0..4).map(|i| record(&format!("http://x.test/{}", i))).collect();
        for r in &records {
            store.insert(r.clone());
        }

        let text = store.export_as_text(None).await;
        for r in &records {
            assert_eq!(text.matches(&r.id().to_string()).count(), 1);
        }

        let single = store.export_record(records[0].id()).await.unwrap();
        assert!(single.contains(&records[0].id().to_string()));
        assert_eq!(store.export_record(RecordId::new()).await, None);
    }

    #[tokio::test]
    async fn test_export_as_json() {
        let store = store_with_capacity(10);
        let r = record("https://api.test/users");
        store.insert(r.clone());

        let json = store.export_as_json().await.unwrap();
        let parsed: Vec<LogRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![r]);
    }

    #[tokio::test]
    async fn test_capacity_follows_config() {
        let config = ConfigHandle::new(Config::default().max_records(10));
        let store = LogStore::new(config.clone());
        for i in 0..5 {
            store.insert(record(&format!("http://x.test/{}", i)));
        }
        config.update(|c| c.max_records = 2);
        store.insert(record("http://x.test/last"));
        assert_eq!(store.count().await, 2);
    }

    proptest! {
        #[test]
        fn prop_store_holds_newest_records(capacity in 1usize..20, inserts in 0usize..50) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let store = store_with_capacity(capacity);
                let records: Vec<_> = (0..inserts)
                    .map(|i| record(&format!("http://x.test/{}", i)))
                    .collect();
                for r in &records {
                    store.insert(r.clone());
                }

                let held: Vec<_> = store.get_all().await.iter().map(LogRecord::id).collect();
                let expected: Vec<_> = records.iter().rev().take(capacity).map(LogRecord::id).collect();
                prop_assert_eq!(held, expected);
                Ok(())
            })?;
        }
    }
}
