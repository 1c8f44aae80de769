use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use super::state::HouseState;
use super::state::Toggle;

/// Handle to the one house the hub simulates.
///
/// Cloning the handle shares the same state. Every read and write goes
/// through a single mutex, so the connection task and the occupant never
/// observe a half-applied update. The lock is never held across an await.
#[derive(Debug, Clone, Default)]
pub struct House {
    inner: Arc<Mutex<HouseState>>,
}

impl House {
    pub fn new(state: HouseState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HouseState> {
        // A panic while holding the lock cannot leave a field half-written,
        // so a poisoned state is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> String {
        self.lock().snapshot()
    }

    /// Copy of the full state, including fields absent from the report.
    pub fn state(&self) -> HouseState {
        self.lock().clone()
    }

    pub fn apply_update<'a, I>(&self, pairs: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.lock().apply_update(pairs);
    }

    pub fn toggle(&self, toggle: Toggle) -> bool {
        self.lock().toggle(toggle)
    }

    /// Run `f` with exclusive access to the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut HouseState) -> R) -> R {
        f(&mut *self.lock())
    }

    /// Advance the simulation. Only the connection server drives time.
    pub(crate) fn tick(&self) {
        self.lock().tick();
    }
}
