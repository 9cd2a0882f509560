//! One FIFO queue, one worker thread.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::OnceLock;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::{BoxError, Result, SchedulerError};

const WORKER_NAME: &str = "single-flight-worker";

static GLOBAL: OnceLock<SingleFlight> = OnceLock::new();

enum Failure {
    Error(BoxError),
    Panic(String),
}

/// A queued unit of work. The result travels back through the channel the
/// action closes over.
struct Job {
    id: Uuid,
    name: String,
    run: Box<dyn FnOnce() + Send + 'static>,
}

/// Serializes jobs onto a single worker thread.
///
/// The worker is spawned on first use and lives for the rest of the process.
/// A job that panics is reported to its caller; the worker keeps serving.
pub struct SingleFlight {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self { sender: Mutex::new(None) }
    }

    /// The scheduler shared by every caller in this process.
    pub fn global() -> &'static SingleFlight {
        GLOBAL.get_or_init(SingleFlight::new)
    }

    /// Queue `action` and return a handle to wait on its outcome.
    pub fn enqueue<T, E, F>(&self, name: impl Into<String>, action: F) -> Result<Pending<T>>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    {
        let name = name.into();
        let id = Uuid::new_v4();
        let (reply_tx, reply_rx) = oneshot::channel::<std::result::Result<T, Failure>>();
        let job_name = name.clone();
        let run = Box::new(move || {
            let outcome = match catch_unwind(AssertUnwindSafe(action)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(Failure::Error(e.into())),
                Err(payload) => Err(Failure::Panic(panic_message(payload.as_ref()))),
            };
            if reply_tx.send(outcome).is_err() {
                tracing::warn!(%id, job = %job_name, "caller stopped waiting, result dropped");
            }
        });

        let mut guard = self.sender.lock();
        let sender = match guard.as_ref() {
            Some(sender) => sender.clone(),
            None => {
                let sender = spawn_worker()?;
                *guard = Some(sender.clone());
                sender
            }
        };
        drop(guard);

        sender
            .send(Job { id, name: name.clone(), run })
            .map_err(|_| SchedulerError::WorkerGone(name.clone()))?;
        tracing::debug!(%id, job = %name, "job queued");
        Ok(Pending { id, name, reply: reply_rx })
    }

    /// Queue `action` and block until it has run.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`SingleFlight::submit_async`] there.
    pub fn submit<T, E, F>(&self, name: impl Into<String>, action: F) -> Result<T>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    {
        self.enqueue(name, action)?.wait()
    }

    pub async fn submit_async<T, E, F>(&self, name: impl Into<String>, action: F) -> Result<T>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    {
        self.enqueue(name, action)?.wait_async().await
    }

    /// Like [`SingleFlight::submit_async`], giving up when `interrupt`
    /// completes first. The job itself still runs to completion.
    pub async fn submit_until<T, E, F, I>(
        &self,
        name: impl Into<String>,
        action: F,
        interrupt: I,
    ) -> Result<T>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
        I: Future<Output = ()>,
    {
        self.enqueue(name, action)?.wait_until(interrupt).await
    }
}

impl Default for SingleFlight {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_worker() -> Result<mpsc::Sender<Job>> {
    let (tx, rx) = mpsc::channel::<Job>();
    std::thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            while let Ok(job) = rx.recv() {
                let Job { id, name, run } = job;
                let started = Instant::now();
                tracing::info!(%id, job = %name, "job started");
                run();
                tracing::info!(
                    %id,
                    job = %name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "job finished"
                );
            }
        })
        .map_err(SchedulerError::Spawn)?;
    Ok(tx)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A queued job whose outcome has not been collected yet.
pub struct Pending<T> {
    id: Uuid,
    name: String,
    reply: oneshot::Receiver<std::result::Result<T, Failure>>,
}

impl<T> Pending<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block the calling thread until the job has run.
    pub fn wait(self) -> Result<T> {
        let outcome = self.reply.blocking_recv();
        finish(self.name, outcome)
    }

    pub async fn wait_async(self) -> Result<T> {
        let outcome = self.reply.await;
        finish(self.name, outcome)
    }

    /// Wait for the job or for `interrupt`, whichever completes first.
    pub async fn wait_until<I>(self, interrupt: I) -> Result<T>
    where
        I: Future<Output = ()>,
    {
        let Pending { id, name, reply } = self;
        tokio::select! {
            outcome = reply => finish(name, outcome),
            _ = interrupt => {
                tracing::warn!(%id, job = %name, "interrupted while waiting, job keeps running");
                Err(SchedulerError::Interrupted(name))
            }
        }
    }
}

fn finish<T>(
    name: String,
    outcome: std::result::Result<std::result::Result<T, Failure>, oneshot::error::RecvError>,
) -> Result<T> {
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(Failure::Error(source))) => Err(SchedulerError::Failed { name, source }),
        Ok(Err(Failure::Panic(message))) => Err(SchedulerError::Panicked { name, message }),
        Err(_) => Err(SchedulerError::WorkerGone(name)),
    }
}
