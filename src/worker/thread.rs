use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::adapter::{DetectOptions, WorkerAdapter};
use crate::config::WorkerConfig;
use crate::decoder::Decoder;
use crate::error::WorkerError;
use crate::models::{DetectedBarcode, ImageData};
use crate::protocol::{Argument, DETECT, Request, Response};

enum Reply {
    /// Response goes to the shared outbound channel
    Post,
    Async(oneshot::Sender<Response>),
    Blocking(Sender<Response>),
}

struct Envelope {
    request: Request,
    reply: Reply,
}

/// Handle to a decoder running on its own thread
///
/// Requests are handled one at a time, in the order they were posted.
/// Dropping the handle closes the mailbox and joins the thread.
pub struct WorkerHandle {
    backend: &'static str,
    inbox: Option<Sender<Envelope>>,
    outbox: Receiver<Response>,
    join: Option<JoinHandle<()>>,
    call_timeout: Option<Duration>,
}

/// Start a worker around `decoder`.
pub fn spawn_worker<D>(decoder: D, config: &WorkerConfig) -> std::io::Result<WorkerHandle>
where
    D: Decoder + 'static,
{
    let backend = decoder.name();
    let adapter = WorkerAdapter::new(decoder, DetectOptions::from(config));
    let (inbox_tx, inbox_rx) = crossbeam_channel::unbounded::<Envelope>();
    let (outbox_tx, outbox_rx) = crossbeam_channel::unbounded::<Response>();

    let join = thread::Builder::new()
        .name(config.resolved_thread_name(backend))
        .spawn(move || run_worker_loop(adapter, inbox_rx, outbox_tx))?;

    Ok(WorkerHandle {
        backend,
        inbox: Some(inbox_tx),
        outbox: outbox_rx,
        join: Some(join),
        call_timeout: config.call_timeout,
    })
}

/// Start a worker around the backend named in `config`.
pub fn spawn_backend(config: &WorkerConfig) -> std::io::Result<WorkerHandle> {
    spawn_worker(config.backend.decoder(), config)
}

fn run_worker_loop<D: Decoder>(
    mut adapter: WorkerAdapter<D>,
    inbox: Receiver<Envelope>,
    outbox: Sender<Response>,
) {
    let backend = adapter.backend();
    info!(backend, "worker started");
    while let Ok(Envelope { request, reply }) = inbox.recv() {
        let response = adapter.handle(request);
        let delivered = match reply {
            Reply::Post => outbox.send(response).is_ok(),
            Reply::Async(tx) => tx.send(response).is_ok(),
            Reply::Blocking(tx) => tx.send(response).is_ok(),
        };
        if !delivered {
            debug!(backend, "caller went away before the response was delivered");
        }
    }
    info!(backend, "worker stopped");
}

impl WorkerHandle {
    /// Name of the wrapped backend
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    fn send(&self, request: Request, reply: Reply) -> Result<(), WorkerError> {
        let inbox = self.inbox.as_ref().ok_or(WorkerError::MailboxClosed)?;
        inbox
            .send(Envelope { request, reply })
            .map_err(|_| WorkerError::MailboxClosed)
    }

    /// Fire-and-forget; the response arrives on [`WorkerHandle::messages`].
    pub fn post_message(&self, request: Request) -> Result<(), WorkerError> {
        self.send(request, Reply::Post)
    }

    /// Outbound channel for posted requests
    pub fn messages(&self) -> &Receiver<Response> {
        &self.outbox
    }

    /// Post a request and await its response.
    ///
    /// An `error` response resolves to [`WorkerError::Remote`]. With a
    /// configured call timeout this must run inside a tokio runtime.
    pub async fn call(
        &self,
        name: impl Into<String>,
        args: Vec<Argument>,
    ) -> Result<Vec<DetectedBarcode>, WorkerError> {
        let (tx, rx) = oneshot::channel();
        self.send(Request::new(name, args), Reply::Async(tx))?;
        let response = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, rx)
                .await
                .map_err(|_| WorkerError::Timeout(limit))?,
            None => rx.await,
        }
        .map_err(|_| WorkerError::WorkerStopped)?;
        response.into_result()
    }

    /// Blocking variant of [`WorkerHandle::call`] for synchronous callers.
    pub fn call_blocking(
        &self,
        name: impl Into<String>,
        args: Vec<Argument>,
    ) -> Result<Vec<DetectedBarcode>, WorkerError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.send(Request::new(name, args), Reply::Blocking(tx))?;
        let response = match self.call_timeout {
            Some(limit) => rx.recv_timeout(limit).map_err(|err| match err {
                crossbeam_channel::RecvTimeoutError::Timeout => WorkerError::Timeout(limit),
                crossbeam_channel::RecvTimeoutError::Disconnected => WorkerError::WorkerStopped,
            })?,
            None => rx.recv().map_err(|_| WorkerError::WorkerStopped)?,
        };
        response.into_result()
    }

    /// `detect` one image
    pub async fn detect(&self, image: ImageData) -> Result<Vec<DetectedBarcode>, WorkerError> {
        self.call(DETECT, vec![Argument::Image(image)]).await
    }

    /// Blocking `detect` of one image
    pub fn detect_blocking(&self, image: ImageData) -> Result<Vec<DetectedBarcode>, WorkerError> {
        self.call_blocking(DETECT, vec![Argument::Image(image)])
    }

    /// Close the mailbox and wait for queued requests to drain.
    pub fn terminate(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.inbox.take();
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                debug!(backend = self.backend, "worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
