//! Funnels work from any thread onto the engine thread.
//!
//! One consumer loop drains a crossbeam channel of boxed jobs. Synchronous
//! submissions wait on a one-slot reply channel; asynchronous ones return as
//! soon as the job is queued. Jobs submitted from the engine thread itself
//! run inline when synchronous, so nested calls cannot deadlock.

use core::panic::AssertUnwindSafe;
use std::panic;
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam::channel::{self, Sender};
use parking_lot::{Mutex, RwLock};

use crate::api::Error;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Stack of the engine thread; document code runs on it recursively.
const STACK_SIZE: usize = 8 * 1024 * 1024;

pub(crate) struct Dispatcher {
    /// `None` once shut down.
    sender: RwLock<Option<Sender<Job>>>,
    thread: ThreadId,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Start the engine thread. `teardown` runs on it after the last job.
    pub(crate) fn spawn(
        name: &str,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Result<Self, Error> {
        let (sender, receiver) = channel::unbounded::<Job>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .stack_size(STACK_SIZE)
            .spawn(move || {
                for job in receiver.iter() {
                    job();
                }
                teardown();
            })
            .map_err(Error::Spawn)?;

        tracing::debug!(thread = name, "engine thread started");
        Ok(Dispatcher {
            sender: RwLock::new(Some(sender)),
            thread: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
        })
    }

    pub(crate) fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    fn submit(&self, job: Job) -> Result<(), Error> {
        let sender = self.sender.read();
        match sender.as_ref() {
            Some(sender) => sender.send(job).map_err(|_| Error::Closed),
            None => Err(Error::Closed),
        }
    }

    /// Run `f` on the engine thread and wait for its result.
    ///
    /// A panic inside `f` is resumed on the calling thread.
    pub(crate) fn run_sync<R, F>(&self, f: F) -> Result<R, Error>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_current() {
            return Ok(f());
        }

        let (reply, result) = channel::bounded(1);
        self.submit(Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f));
            // The caller only goes away by panicking itself.
            let _ = reply.send(outcome);
        }))?;

        match result.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(Error::Closed),
        }
    }

    /// Queue `f` on the engine thread without waiting.
    ///
    /// Jobs from one thread run in submission order. A panic inside `f` is
    /// logged and does not stop the engine thread.
    pub(crate) fn run_async<F>(&self, f: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                tracing::error!(panic = panic_message(&*payload), "async engine job panicked");
            }
        }))
    }

    /// Refuse new jobs, let accepted ones finish and join the thread.
    ///
    /// Idempotent. When called on the engine thread the join is skipped and
    /// the thread exits after the running job.
    pub(crate) fn shutdown(&self) {
        let sender = self.sender.write().take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        if self.is_current() {
            return;
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                tracing::error!("engine thread panicked during shutdown");
            }
        }
    }
}

fn panic_message(payload: &(dyn core::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
