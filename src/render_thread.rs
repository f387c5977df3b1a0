// Render thread - a worker that owns a renderer for its whole lifetime
//
// The worker builds its value, reports startup, then sleeps on a condvar
// until shutdown is requested. It drops the value and acknowledges before
// the main thread joins it. The two threads share nothing else.

use anyhow::{anyhow, Context, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;

enum Phase {
    Starting,
    Running,
    StopRequested,
    Stopped,
    Failed(anyhow::Error),
}

struct Shared {
    phase: Mutex<Phase>,
    changed: Condvar,
}

impl Shared {
    fn set(&self, phase: Phase) {
        *self.phase.lock() = phase;
        self.changed.notify_all();
    }
}

/// Marks the worker as stopped however it exits, panics included
struct StopOnExit(Arc<Shared>);

impl Drop for StopOnExit {
    fn drop(&mut self) {
        let mut phase = self.0.phase.lock();
        if !matches!(*phase, Phase::Failed(_)) {
            *phase = Phase::Stopped;
        }
        self.0.changed.notify_all();
    }
}

pub struct RenderThread {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Start a worker that runs `build` and keeps the result alive until
    /// shutdown. Returns once the worker is running, or with the build error.
    pub fn spawn<R, F>(name: &str, build: F) -> Result<Self>
    where
        F: FnOnce() -> Result<R> + Send + 'static,
        R: 'static,
    {
        let shared = Arc::new(Shared {
            phase: Mutex::new(Phase::Starting),
            changed: Condvar::new(),
        });

        let worker_shared = shared.clone();
        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || Self::run(worker_shared, build))
            .context("Failed to spawn render thread")?;

        let mut thread = Self {
            shared,
            handle: Some(handle),
        };

        let startup = {
            let mut phase = thread.shared.phase.lock();
            while matches!(*phase, Phase::Starting) {
                thread.shared.changed.wait(&mut phase);
            }
            match std::mem::replace(&mut *phase, Phase::Stopped) {
                Phase::Running => {
                    *phase = Phase::Running;
                    Ok(())
                }
                Phase::Failed(e) => Err(e),
                _ => Err(anyhow!("Render thread exited during startup")),
            }
        };

        if let Err(e) = startup {
            // Worker is already on its way out
            let _ = thread.join();
            return Err(e);
        }

        log::info!("Render thread '{}' running", name);
        Ok(thread)
    }

    fn run<R, F>(shared: Arc<Shared>, build: F)
    where
        F: FnOnce() -> Result<R>,
    {
        let _exit = StopOnExit(shared.clone());

        let value = match build() {
            Ok(value) => value,
            Err(e) => {
                log::error!("Render thread startup failed: {:#}", e);
                shared.set(Phase::Failed(e));
                return;
            }
        };

        {
            let mut phase = shared.phase.lock();
            *phase = Phase::Running;
            shared.changed.notify_all();

            while !matches!(*phase, Phase::StopRequested) {
                shared.changed.wait(&mut phase);
            }
        }

        log::debug!("Render thread releasing its resources");
        drop(value);
        // StopOnExit acknowledges
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.shared.phase.lock(), Phase::Running)
    }

    /// Ask the worker to stop, wait for it to drop its value, then join it.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.handle.is_none() {
            return Ok(());
        }

        {
            let mut phase = self.shared.phase.lock();
            if matches!(*phase, Phase::Running) {
                *phase = Phase::StopRequested;
                self.shared.changed.notify_all();
            }
            while !matches!(*phase, Phase::Stopped | Phase::Failed(_)) {
                self.shared.changed.wait(&mut phase);
            }
        }

        self.join()?;
        log::info!("Render thread stopped");
        Ok(())
    }

    fn join(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("Render thread panicked")),
            None => Ok(()),
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("Render thread shutdown failed: {:#}", e);
        }
    }
}
