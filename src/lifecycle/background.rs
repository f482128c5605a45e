//! Spawning of background work, with or without a host runtime.

use std::future::Future;
use std::thread;

/// Run blocking work off the caller's thread.
///
/// Uses Tokio's blocking pool when called inside a runtime, otherwise a
/// dedicated named thread, so synchronous hosts get the same behaviour.
pub fn spawn_blocking<F>(name: &'static str, task: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(task);
        }
        Err(_) => {
            if let Err(e) = thread::Builder::new().name(name.to_string()).spawn(task) {
                tracing::warn!(task = name, error = %e, "Failed to spawn maintenance thread");
            }
        }
    }
}

/// Run a long-lived future in the background.
///
/// Inside a runtime the future becomes a Tokio task. Otherwise a named
/// thread drives it on its own current-thread runtime until it completes.
pub fn spawn_task<F>(name: &'static str, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        handle.spawn(task);
        return;
    }

    let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
        match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime.block_on(task),
            Err(e) => tracing::warn!(task = name, error = %e, "Failed to build background runtime"),
        }
    });
    if let Err(e) = spawned {
        tracing::warn!(task = name, error = %e, "Failed to spawn background thread");
    }
}
