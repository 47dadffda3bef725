//! RecordBuffer - fixed-capacity FIFO between sources and the dispatcher
//!
//! Every source worker holds a `BufferSender` clone; the dispatcher is the
//! sole consumer. A full buffer blocks producers (backpressure), an empty
//! buffer blocks the consumer. Both sides give up as soon as the pipeline
//! cancellation token fires.

use async_channel::{bounded, Receiver, Sender};
use tokio_util::sync::CancellationToken;

use crate::Record;

/// Constructor namespace for the shared buffer
pub struct RecordBuffer;

impl RecordBuffer {
    /// Create a bounded buffer
    ///
    /// A zero capacity is raised to one; the capacity never changes afterwards.
    pub fn bounded(capacity: usize) -> (BufferSender, BufferReceiver) {
        let (tx, rx) = bounded(capacity.max(1));
        (BufferSender { tx }, BufferReceiver { rx })
    }
}

/// Producer side of the buffer
#[derive(Debug, Clone)]
pub struct BufferSender {
    tx: Sender<Record>,
}

impl BufferSender {
    /// Push a record, waiting while the buffer is full
    ///
    /// Returns `false` when the record was not accepted because the pipeline
    /// is shutting down (token cancelled or buffer closed). Sources should
    /// return `Ok(())` in that case.
    pub async fn push(&self, record: Record, cancel: &CancellationToken) -> bool {
        matches!(
            cancel.run_until_cancelled(self.tx.send(record)).await,
            Some(Ok(()))
        )
    }

    /// Number of records currently queued
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the buffer
#[derive(Debug, Clone)]
pub struct BufferReceiver {
    rx: Receiver<Record>,
}

impl BufferReceiver {
    /// Pop the next record, waiting while the buffer is empty
    ///
    /// Returns `None` when cancelled, or when every sender is gone and the
    /// buffer has been drained.
    pub async fn pop(&self, cancel: &CancellationToken) -> Option<Record> {
        cancel
            .run_until_cancelled(self.rx.recv())
            .await
            .and_then(Result::ok)
    }

    /// Stop accepting new records; queued records can still be popped
    pub fn close(&self) -> bool {
        self.rx.close()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Fixed capacity chosen at construction
    pub fn capacity(&self) -> usize {
        self.rx.capacity().unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let (tx, rx) = RecordBuffer::bounded(4);
        let cancel = CancellationToken::new();

        for i in 0..3 {
            assert!(tx.push(Record::from(format!("r{i}")), &cancel).await);
        }
        drop(tx);

        let mut seen = Vec::new();
        while let Some(record) = rx.pop(&cancel).await {
            seen.push(record);
        }
        assert_eq!(
            seen,
            vec![Record::from("r0"), Record::from("r1"), Record::from("r2")]
        );
    }

    #[tokio::test]
    async fn test_full_buffer_blocks_until_cancelled() {
        let (tx, _rx) = RecordBuffer::bounded(1);
        let cancel = CancellationToken::new();
        assert!(tx.push(Record::from("a"), &cancel).await);

        let blocked = {
            let tx = tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { tx.push(Record::from("b"), &cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        cancel.cancel();
        assert!(!blocked.await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_buffer_rejects_push() {
        let (tx, rx) = RecordBuffer::bounded(2);
        let cancel = CancellationToken::new();
        rx.close();
        assert!(!tx.push(Record::from("late"), &cancel).await);
        assert!(tx.is_closed());
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let (_tx, rx) = RecordBuffer::bounded(0);
        assert_eq!(rx.capacity(), 1);
    }
}
