use tokio::sync::watch;

/// Create a linked stop handle and signal.
///
/// The handle side is given to whoever may request shutdown (a Ctrl-C task, a
/// scheduler); the signal side is polled by the ingestion loop.
#[must_use]
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Requests a cooperative stop.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Ask every linked [`StopSignal`] to stop. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes a cooperative stop request.
///
/// Dropping the [`StopHandle`] without calling `stop` means the signal never fires.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        stop_channel().1
    }

    /// True once a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when a stop is requested; pend forever if that cannot happen.
    pub async fn stopped(&mut self) {
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

/// Outcome of an interruptible sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Wake {
    /// The full duration passed.
    Elapsed,
    /// A stop request cut the sleep short.
    Stopped,
}

/// Sleep for `duration` unless `stop` fires first.
pub async fn sleep_or_stop(duration: std::time::Duration, stop: &mut StopSignal) -> Wake {
    if stop.is_stopped() {
        return Wake::Stopped;
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => Wake::Elapsed,
        () = stop.stopped() => Wake::Stopped,
    }
}
