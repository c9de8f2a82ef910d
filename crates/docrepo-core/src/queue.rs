//! Uncoordinated queue consumption
//!
//! Consumers never lock, elect a leader or agree on an order. Each attempt
//! lists the queue, picks a random message, reads it and deletes it; only the
//! consumer whose delete actually removed the message returns it.
//!
//! ```text
//! Listing ──empty──▶ Empty
//!    │
//!    ▼
//! Selecting ──▶ Reading ──gone──▶ Listing
//!                  │
//!                  ▼
//!              Deleting ──lost──▶ Listing
//!                  │
//!                  ▼
//!                Done
//! ```
//!
//! Delivery is at-most-once: a consumer that dies after its delete succeeded
//! loses the message. The loop has no deadline of its own.

use docrepo_storage::{Result, StorageBackend};
use rand::seq::SliceRandom;
use tracing::{debug, trace};

/// Result of one dequeue call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    /// This consumer removed `key` and owns `value`
    Message { key: String, value: Vec<u8> },
    /// Nothing was listed under the prefix
    Empty,
}

impl Dequeued {
    /// The message payload, if any
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            Dequeued::Message { value, .. } => Some(value),
            Dequeued::Empty => None,
        }
    }
}

/// Take one message stored under `prefix`
///
/// Races lost to other consumers are retried silently. Backend failures end
/// the call with the error.
pub async fn dequeue<B>(backend: &B, prefix: &str) -> Result<Dequeued>
where
    B: StorageBackend + ?Sized,
{
    let mut lost_races = 0u32;

    loop {
        let keys = backend.list(prefix).await?;
        let Some(key) = pick_random(&keys) else {
            if lost_races > 0 {
                debug!("Queue {} drained after {} lost races", prefix, lost_races);
            }
            return Ok(Dequeued::Empty);
        };

        let Some(value) = backend.read(&key).await? else {
            lost_races += 1;
            trace!("Message {} vanished before read, relisting", key);
            continue;
        };

        if backend.delete(&key).await? {
            if lost_races > 0 {
                debug!("Dequeued {} after {} lost races", key, lost_races);
            }
            return Ok(Dequeued::Message { key, value });
        }

        lost_races += 1;
        trace!("Message {} taken by another consumer, relisting", key);
    }
}

fn pick_random(keys: &[String]) -> Option<String> {
    keys.choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use docrepo_storage::{AccessMode, MemoryBackend};
    use parking_lot::Mutex;

    use super::*;

    async fn fill(backend: &MemoryBackend, messages: &[&str]) {
        for (index, message) in messages.iter().enumerate() {
            backend
                .write(
                    &format!("queues/jobs/{index}.json"),
                    message.as_bytes(),
                    AccessMode::Updatable,
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let backend = MemoryBackend::new();
        assert_eq!(dequeue(&backend, "queues/jobs/").await.unwrap(), Dequeued::Empty);
    }

    #[tokio::test]
    async fn test_sequential_drain_returns_every_message_once() {
        let backend = MemoryBackend::new();
        fill(&backend, &["a", "b", "c", "d"]).await;

        let mut seen = HashSet::new();
        for _ in 0..4 {
            let value = dequeue(&backend, "queues/jobs/").await.unwrap().into_value().unwrap();
            assert!(seen.insert(value));
        }

        let expected: HashSet<Vec<u8>> =
            ["a", "b", "c", "d"].iter().map(|m| m.as_bytes().to_vec()).collect();
        assert_eq!(seen, expected);
        assert_eq!(dequeue(&backend, "queues/jobs/").await.unwrap(), Dequeued::Empty);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_other_queues_untouched() {
        let backend = MemoryBackend::new();
        backend
            .write("queues/other/1.json", b"keep", AccessMode::Updatable)
            .await
            .unwrap();
        assert_eq!(dequeue(&backend, "queues/jobs/").await.unwrap(), Dequeued::Empty);
        assert_eq!(backend.len(), 1);
    }

    /// Lets a competing consumer win the first message this backend hands out
    struct CompetingConsumer {
        inner: MemoryBackend,
        stolen: Mutex<Option<(String, Vec<u8>)>>,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl StorageBackend for CompetingConsumer {
        fn name(&self) -> &'static str {
            "competing"
        }

        async fn key_exists(&self, key: &str) -> Result<bool> {
            self.inner.key_exists(key).await
        }

        async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
            let value = self.inner.read(key).await?;
            let steal = match &value {
                Some(value) => {
                    let mut stolen = self.stolen.lock();
                    let first = stolen.is_none();
                    if first {
                        *stolen = Some((key.to_string(), value.clone()));
                    }
                    first
                }
                None => false,
            };
            if steal {
                // the competitor read the same key and deletes it first
                assert!(self.inner.delete(key).await?);
            }
            Ok(value)
        }

        async fn write(&self, key: &str, bytes: &[u8], mode: AccessMode) -> Result<()> {
            self.inner.write(key, bytes, mode).await
        }

        async fn delete(&self, key: &str) -> Result<bool> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(key).await
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>> {
            self.inner.list(prefix).await
        }
    }

    #[tokio::test]
    async fn test_lost_race_never_returns_delivered_value() {
        let backend = CompetingConsumer {
            inner: MemoryBackend::new(),
            stolen: Mutex::new(None),
            deletes: AtomicUsize::new(0),
        };
        fill(&backend.inner, &["x", "y"]).await;

        let won = dequeue(&backend, "queues/jobs/").await.unwrap().into_value().unwrap();
        let (_, stolen_value) = backend.stolen.lock().clone().unwrap();

        assert_ne!(won, stolen_value);
        // one losing delete, one winning delete
        assert_eq!(backend.deletes.load(Ordering::SeqCst), 2);
        assert_eq!(dequeue(&backend, "queues/jobs/").await.unwrap(), Dequeued::Empty);
    }

    #[tokio::test]
    async fn test_lost_race_on_last_message_ends_empty() {
        let backend = CompetingConsumer {
            inner: MemoryBackend::new(),
            stolen: Mutex::new(None),
            deletes: AtomicUsize::new(0),
        };
        fill(&backend.inner, &["only"]).await;

        assert_eq!(dequeue(&backend, "queues/jobs/").await.unwrap(), Dequeued::Empty);
        assert!(backend.stolen.lock().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consumers_share_messages() {
        let backend = Arc::new(MemoryBackend::new());
        let messages: Vec<String> = (0..20).map(|i| format!("m{i}")).collect();
        for message in &messages {
            backend
                .write(
                    &format!("queues/jobs/{message}.json"),
                    message.as_bytes(),
                    AccessMode::Updatable,
                )
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..32 {
            let backend = backend.clone();
            handles.push(tokio::spawn(async move {
                dequeue(&backend, "queues/jobs/").await.unwrap().into_value()
            }));
        }

        let mut delivered = Vec::new();
        let mut empty = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Some(value) => delivered.push(String::from_utf8(value).unwrap()),
                None => empty += 1,
            }
        }

        assert_eq!(delivered.len(), 20);
        assert_eq!(empty, 12);
        let unique: HashSet<&String> = delivered.iter().collect();
        assert_eq!(unique.len(), 20);
    }
}
