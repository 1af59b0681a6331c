//! Lazy collection streaming.
//!
//! # Responsibilities
//! - Run a collection producer as its own task
//! - Hand items to the consumer one at a time over a bounded channel
//! - Stop the producer when the consumer closes or drops the stream
//!
//! # Design Decisions
//! - Handoff capacity is 1, the smallest tokio allows, so the producer never
//!   runs more than one item ahead of the encoder
//! - Single pass: once drained the stream yields `None` forever
//! - Dropping the stream aborts the producer task, which covers producers
//!   parked on something other than the channel

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::model::error::{ModelError, ModelResult};

/// Number of items that may sit between producer and consumer.
pub const HANDOFF_CAPACITY: usize = 1;

/// Returned by [`ItemSink::send`] once the consumer has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("item stream closed by consumer")]
pub struct StreamClosed;

/// Consumer side of a collection read.
pub struct ItemStream<T> {
    rx: mpsc::Receiver<ModelResult<T>>,
    producer: Option<AbortHandle>,
}

/// Producer side of a collection read.
pub struct ItemSink<T> {
    tx: mpsc::Sender<ModelResult<T>>,
}

impl<T: Send + 'static> ItemStream<T> {
    /// Spawn `produce` as a task feeding the returned stream.
    pub fn spawn<F, Fut>(produce: F) -> Self
    where
        F: FnOnce(ItemSink<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(HANDOFF_CAPACITY);
        let handle = tokio::spawn(produce(ItemSink { tx }));

        Self {
            rx,
            producer: Some(handle.abort_handle()),
        }
    }

    /// Stream the values of an iterator from a producer task.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T> + Send + 'static,
        I::IntoIter: Send,
    {
        Self::spawn(move |sink| async move {
            for value in values {
                if sink.send(value).await.is_err() {
                    tracing::trace!("Consumer went away, stopping producer");
                    break;
                }
            }
        })
    }
}

impl<T> ItemStream<T> {
    /// A stream that is already exhausted.
    pub fn empty() -> Self {
        let (_, rx) = mpsc::channel(HANDOFF_CAPACITY);
        Self { rx, producer: None }
    }

    /// Wait for the next item. `None` once the producer has finished.
    pub async fn next_item(&mut self) -> Option<ModelResult<T>> {
        self.rx.recv().await
    }

    /// Stop the producer. An item already handed off may still be yielded.
    pub fn close(&mut self) {
        self.rx.close();
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl<T> Stream for ItemStream<T> {
    type Item = ModelResult<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> Drop for ItemStream<T> {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl<T> std::fmt::Debug for ItemStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStream")
            .field("producer_running", &self.producer.as_ref().is_some_and(|p| !p.is_finished()))
            .finish()
    }
}

impl<T> ItemSink<T> {
    /// Hand one item to the consumer, waiting until it has room.
    pub async fn send(&self, item: T) -> Result<(), StreamClosed> {
        self.tx.send(Ok(item)).await.map_err(|_| StreamClosed)
    }

    /// Report a backend fault and end the stream.
    pub async fn fail(self, err: ModelError) {
        if self.tx.send(Err(err)).await.is_err() {
            tracing::trace!("Consumer went away before producer error was delivered");
        }
    }

    /// Whether the consumer has closed or dropped the stream.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the consumer has closed or dropped the stream.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}
