//! Single-flight admission for edit requests.
//!
//! Two agents editing the same tree at once produce interleaved writes, so
//! by default only one request may hold the slot. The slot is released when
//! the agent process exits, not when the caller goes away.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use pinpoint_common::mutex_lock_or_recover;
use pinpoint_domain::BridgeError;

#[derive(Debug, Clone)]
pub struct InFlight {
    pub location: String,
    pub started: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct InFlightSlot {
    current: Arc<Mutex<Option<InFlight>>>,
}

impl InFlightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, location: impl Into<String>) -> Result<SlotGuard, BridgeError> {
        let mut current = mutex_lock_or_recover(&self.current);
        if let Some(running) = current.as_ref() {
            return Err(BridgeError::Busy {
                location: running.location.clone(),
            });
        }
        *current = Some(InFlight {
            location: location.into(),
            started: Instant::now(),
        });
        Ok(SlotGuard {
            current: Arc::clone(&self.current),
        })
    }

    pub fn current(&self) -> Option<InFlight> {
        mutex_lock_or_recover(&self.current).clone()
    }
}

/// Frees the slot on drop.
#[derive(Debug)]
pub struct SlotGuard {
    current: Arc<Mutex<Option<InFlight>>>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        mutex_lock_or_recover(&self.current).take();
    }
}

/// How concurrent edit requests are admitted.
#[derive(Debug, Clone)]
pub enum Admission {
    SingleFlight(InFlightSlot),
    Concurrent,
}

impl Admission {
    pub fn single_flight() -> Self {
        Admission::SingleFlight(InFlightSlot::new())
    }

    pub fn from_flag(single_flight: bool) -> Self {
        if single_flight {
            Self::single_flight()
        } else {
            Admission::Concurrent
        }
    }

    /// `Ok(None)` means admitted without a slot.
    pub fn admit(&self, location: impl Into<String>) -> Result<Option<SlotGuard>, BridgeError> {
        match self {
            Admission::SingleFlight(slot) => slot.try_acquire(location).map(Some),
            Admission::Concurrent => Ok(None),
        }
    }

    pub fn is_single_flight(&self) -> bool {
        matches!(self, Admission::SingleFlight(_))
    }
}
