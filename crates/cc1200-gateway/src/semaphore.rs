use std::{
    sync::{Condvar, Mutex, MutexGuard},
    time::Duration,
};

/// A counting semaphore.
///
/// Interrupt workers [`release()`](Semaphore::release) one permit per queued packet;
/// the dispatcher [`acquire()`](Semaphore::acquire)s one permit per drain cycle.
#[derive(Debug, Default)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    fn permits(&self) -> MutexGuard<'_, usize> {
        // a counter cannot be left inconsistent by a panicking holder
        self.permits.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn release(&self) {
        *self.permits() += 1;
        self.available.notify_one();
    }

    /// Block until a permit is available and take it.
    pub fn acquire(&self) {
        let mut permits = self.permits();
        while *permits == 0 {
            permits = self
                .available
                .wait(permits)
                .unwrap_or_else(|e| e.into_inner());
        }
        *permits -= 1;
    }

    /// Take a permit if one is available.
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits();
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    /// Block until a permit is available or `timeout` elapses.
    ///
    /// Returns `true` if a permit was taken.
    pub fn acquire_timeout(&self, timeout: Duration) -> bool {
        let permits = self.permits();
        let (mut permits, _) = self
            .available
            .wait_timeout_while(permits, timeout, |p| *p == 0)
            .unwrap_or_else(|e| e.into_inner());
        if *permits == 0 {
            return false;
        }
        *permits -= 1;
        true
    }

    pub fn available_permits(&self) -> usize {
        *self.permits()
    }
}
