//! # Write serializer
//!
//! At-most-one in-flight write per logical store, within this process. Writers
//! for the same store id queue behind a fair per-store lock, so submission
//! order is commit order and no two writers interleave their load/save pairs.
//! Different store ids get independent locks and never block each other.
//!
//! This is intra-process discipline only; it offers nothing against a second
//! server process sharing the same files.

use std::{collections::HashMap, future::Future, sync::Arc};

use tokio::sync::Mutex;

#[derive(Default)]
pub struct WriteSerializer {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl WriteSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `writer` inside the store's serialized slot.
    ///
    /// The writer must do its own load-validate-save against the latest
    /// committed document; anything computed before entering the slot may be
    /// stale by the time the slot is granted. A failing writer releases the
    /// slot normally and does not stall writers queued behind it.
    pub async fn run<T, F, Fut>(&self, store_id: &str, writer: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(store_id.to_string()).or_default().clone()
        };

        // Tokio mutexes are fair: waiters are granted in request order.
        let _guard = slot.lock().await;
        writer().await
    }
}
