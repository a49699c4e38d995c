use std::cell::Cell;
use std::rc::Rc;

/// Milliseconds since the Unix epoch, used to age cached suggestions.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new(1_000.0);
        let handle = clock.clone();
        handle.advance(250.0);
        assert_eq!(clock.now_ms(), 1_250.0);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let first = SystemClock.now_ms();
        assert!(first > 0.0);
        assert!(SystemClock.now_ms() >= first);
    }
}
