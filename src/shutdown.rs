//! Interrupt handling: a ctrl-c handler feeding a watch channel the poll
//! loop can race against.

use tokio::sync::watch;

use crate::error::AppResult;

/// Receiving side of the shutdown flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Sending side of the shutdown flag.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn channel() -> (ShutdownTrigger, Shutdown) {
        let (tx, rx) = watch::channel(false);
        (ShutdownTrigger { tx }, Shutdown { rx })
    }

    /// Install a ctrl-c handler that requests shutdown.
    pub fn install_ctrlc() -> AppResult<Shutdown> {
        let (trigger, shutdown) = Self::channel();
        ctrlc::set_handler(move || {
            trigger.trigger();
        })?;
        Ok(shutdown)
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested. Never resolves if the
    /// trigger is dropped without firing.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // send_replace succeeds even with no receivers left
        self.tx.send_replace(true);
    }
}
