//! Bounded collection channels for results and terminal errors.

use crate::error::{JobError, JobResult};
use tokio::sync::mpsc;

/// Creates a sink holding at most `capacity` items (minimum 1).
pub fn sink<T>(name: &'static str, capacity: usize) -> (Sink<T>, SinkDrain<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Sink { name, tx }, SinkDrain { rx })
}

/// Write half, cloned into every worker.
#[derive(Debug)]
pub struct Sink<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<T> Sink<T> {
    /// Append an item, waiting if the sink is full.
    pub async fn emit(&self, item: T) -> JobResult<()> {
        self.tx
            .send(item)
            .await
            .map_err(|_| JobError::SinkClosed(self.name))
    }

    /// Sink name used in errors and logs.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Read half, owned by the coordinator.
#[derive(Debug)]
pub struct SinkDrain<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> SinkDrain<T> {
    /// Close the sink and collect everything buffered, in arrival order.
    pub async fn drain(mut self) -> Vec<T> {
        self.rx.close();
        let mut items = Vec::with_capacity(self.rx.len());
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        items
    }
}
