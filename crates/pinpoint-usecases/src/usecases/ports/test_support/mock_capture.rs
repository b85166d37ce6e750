use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use crate::usecases::ports::CaptureSubscription;
use crate::usecases::ports::InputCapture;

/// Counts live subscriptions instead of touching a real window.
#[derive(Clone, Default)]
pub struct MockInputCapture {
    active: Arc<AtomicUsize>,
    acquired: Arc<AtomicUsize>,
}

impl MockInputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions currently attached.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Subscriptions ever attached.
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }
}

impl InputCapture for MockInputCapture {
    fn acquire(&self) -> CaptureSubscription {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
        let active = Arc::clone(&self.active);
        CaptureSubscription::new(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
