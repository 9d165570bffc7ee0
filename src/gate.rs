use log::trace;
use parking_lot::{Mutex, MutexGuard};

/// Single binary token serializing every access to the backing file.
///
/// Acquisition blocks without a timeout. The token is not reentrant: code
/// running under a guard must receive the guarded value by reference instead
/// of acquiring again.
pub struct AvailabilityGate<T> {
    inner: Mutex<T>,
}

impl<T> AvailabilityGate<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    pub fn acquire(&self) -> MutexGuard<'_, T> {
        trace!("Acquiring log gate");
        self.inner.lock()
    }
}
