use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Quiet-period gate for rapid input such as search keystrokes.
///
/// Each keystroke calls [`Debouncer::settle`]. The call waits out the quiet
/// period and returns true only if no later call started in the meantime, so
/// at most one fetch is issued per burst of typing.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    seq: AtomicU64,
}

impl Debouncer {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seq: AtomicU64::new(0),
        }
    }

    /// Wait out the quiet period. Returns false when superseded.
    pub async fn settle(&self) -> bool {
        let token = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.seq.load(Ordering::SeqCst) == token
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}
