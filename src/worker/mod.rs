//! Decoder workers
//!
//! [`WorkerAdapter`] maps protocol requests onto a [`Decoder`](crate::decoder::Decoder)
//! call. [`spawn_worker`] runs an adapter on its own thread and hands back a
//! [`WorkerHandle`] with a post/receive pair and an async `call`.

pub mod adapter;
pub mod thread;

pub use adapter::{DetectOptions, WorkerAdapter};
pub use thread::{WorkerHandle, spawn_backend, spawn_worker};
