//! # dedup-queue: bounded-concurrency, deduplicating task queue
//!
//! Callers submit work items identified by a derived key; the queue runs at
//! most `parallelism` items concurrently through a caller-supplied
//! [`Processor`], and two submissions sharing a key execute exactly once,
//! with every waiting caller receiving the single outcome. Completed entries
//! stay cached for the queue's lifetime, so resubmitting a finished key
//! resolves without touching the processor again.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use dedup_queue::{AsyncQueue, ProcessError, Processor, QueueConfig};
//!
//! struct Doubler;
//!
//! #[async_trait]
//! impl Processor for Doubler {
//!     type Item = u64;
//!     type Key = u64;
//!     type Output = u64;
//!
//!     fn key(&self, item: &u64) -> u64 {
//!         *item
//!     }
//!
//!     async fn process(&self, item: Arc<u64>) -> Result<u64, ProcessError> {
//!         Ok(*item * 2)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = AsyncQueue::new(QueueConfig::new("doubler").with_parallelism(4), Doubler);
//!     let doubled = queue.submit_wait(21).await?;
//!     assert_eq!(doubled, 42);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod processor;
pub mod queue;

mod coordinator;
mod entry;
mod fifo;

pub use config::{QueueConfig, DEFAULT_PARALLELISM};
pub use error::{ProcessError, QueueError};
pub use processor::Processor;
pub use queue::AsyncQueue;
