//! Global input interception port for the picker.

/// Held while the picker intercepts pointer input.
///
/// Dropping the subscription detaches the capturing listeners and restores
/// the cursor; there is no other way to release them.
pub struct CaptureSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CaptureSubscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl Drop for CaptureSubscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for CaptureSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSubscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

pub trait InputCapture {
    /// Attaches window-level pointer-move and click listeners with capture
    /// semantics and switches the cursor to picking mode.
    fn acquire(&self) -> CaptureSubscription;
}
