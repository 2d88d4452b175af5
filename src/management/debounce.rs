use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tokio::time::sleep;

/// Collapses a burst of triggers into the last one.
///
/// Every [`settle`](Debouncer::settle) call takes a ticket and waits out the
/// window; only the call holding the newest ticket when its window ends gets
/// `true` back.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: AtomicU64::new(0),
        }
    }

    pub async fn settle(&self) -> bool {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.window.is_zero() {
            sleep(self.window).await;
        }
        self.generation.load(Ordering::SeqCst) == ticket
    }
}
