//! Where detached calls run.
//!
//! # Design
//! `spawn_execute` and `spawn_fetch_image` must work from threads that have
//! no tokio context, such as a UI thread. Work goes to, in order: the handle
//! the caller configured, the ambient runtime of the calling thread, or a
//! fresh current-thread runtime on its own OS thread. `on_done` always runs
//! exactly once; it only sees an error when that last runtime cannot be built.

use std::future::Future;
use std::io;
use std::thread;

use tokio::runtime::{Builder, Handle};
use tracing::debug;

pub(crate) fn run_detached<W, O, F>(runtime: Option<&Handle>, work: W, on_done: F)
where
    W: Future<Output = O> + Send + 'static,
    O: Send + 'static,
    F: FnOnce(io::Result<O>) + Send + 'static,
{
    if let Some(handle) = runtime.cloned().or_else(|| Handle::try_current().ok()) {
        handle.spawn(async move { on_done(Ok(work.await)) });
        return;
    }

    debug!("no tokio runtime available, running call on a dedicated thread");
    thread::spawn(move || {
        let outcome = Builder::new_current_thread()
            .enable_all()
            .build()
            .map(|rt| rt.block_on(work));
        on_done(outcome);
    });
}
