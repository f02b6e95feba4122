//! Fetch concurrency limiter.
//!
//! A semaphore-based permit pool that caps the number of tile downloads
//! in flight at once. A large rectangle can hold thousands of tiles;
//! issuing them all simultaneously exhausts the network stack and trips
//! provider rate limits, so workers take a permit before each request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps concurrent tile fetches across all workers.
#[derive(Debug)]
pub struct FetchLimiter {
    /// Semaphore controlling concurrent requests
    semaphore: Arc<Semaphore>,

    /// Maximum permits (for stats/debugging)
    max_permits: usize,

    /// Current number of in-flight requests
    in_flight: AtomicUsize,

    /// Peak concurrent requests observed (for tuning)
    peak_in_flight: AtomicUsize,
}

impl FetchLimiter {
    /// Creates a new limiter with the specified maximum concurrent fetches.
    ///
    /// # Panics
    ///
    /// Panics if `max_concurrent` is 0; configuration clamps the
    /// user-supplied value to at least 1 before it reaches here.
    pub fn new(max_concurrent: usize) -> Self {
        assert!(max_concurrent > 0, "max_concurrent must be > 0");

        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_permits: max_concurrent,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Acquires a permit, waiting while the pool is exhausted.
    ///
    /// The permit is released when dropped.
    pub async fn acquire(&self) -> FetchPermit<'_> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore closed unexpectedly");

        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;

        let mut peak = self.peak_in_flight.load(Ordering::Relaxed);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }

        FetchPermit {
            _permit: permit,
            in_flight: &self.in_flight,
        }
    }

    /// Returns the maximum number of concurrent fetches allowed.
    pub fn max_concurrent(&self) -> usize {
        self.max_permits
    }

    /// Returns the current number of in-flight fetches.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Returns the peak number of concurrent fetches observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    /// Returns the number of available permits.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// A permit for one in-flight tile fetch.
///
/// Counts against the limiter while held; released on drop.
pub struct FetchPermit<'a> {
    _permit: OwnedSemaphorePermit,
    in_flight: &'a AtomicUsize,
}

impl Drop for FetchPermit<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
