//! In-process job queues for Vermeer.
//!
//! A [`ChannelJobQueue`] routes each [`Job`](vermeer_core::Job) to the
//! mpsc channel registered for its queue name. A [`Worker`] drains one
//! channel, runs jobs through a [`JobHandler`] with bounded concurrency, and
//! retries transient failures with exponential backoff until the attempt
//! budget runs out.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use vermeer_core::PLAN_EXECUTION_QUEUE;
//! # use vermeer_queue::{ChannelJobQueue, JobHandler, QueueSettings, Worker};
//! # fn handler() -> Arc<dyn JobHandler> { unimplemented!() }
//! # #[tokio::main]
//! # async fn main() {
//! let mut queue = ChannelJobQueue::new();
//! let receiver = queue.register(PLAN_EXECUTION_QUEUE, QueueSettings::generation());
//! let queue = Arc::new(queue);
//! let worker = Worker::spawn(receiver, handler());
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod channel_queue;
mod retry;
mod worker;

pub use channel_queue::{ChannelJobQueue, QueueReceiver};
pub use retry::QueueSettings;
pub use worker::{JobHandler, Worker};
