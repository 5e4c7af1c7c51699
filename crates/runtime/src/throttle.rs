/// Trailing-edge throttle for redraw coalescing.
///
/// During a drag, every pointer move mutates the model, but redraws are
/// expensive. The gate coalesces any number of requests within its window
/// into a single fire at the end of the window.
///
/// Determinism: callers supply the clock in milliseconds. No timers, no
/// wall-clock reads; tests drive time explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderGate {
    window_ms: u64,
    deadline: Option<u64>,
}

pub const DRAG_RENDER_DELAY_MS: u64 = 50;

impl RenderGate {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            deadline: None,
        }
    }

    /// Asks for a redraw. Requests while one is already pending are
    /// absorbed; the deadline of the first request stands.
    pub fn request(&mut self, now_ms: u64) {
        if self.deadline.is_none() {
            self.deadline = Some(now_ms + self.window_ms);
        }
    }

    /// Returns `true` exactly once per window, when the pending deadline
    /// has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops any pending request, e.g. at the end of a gesture where the
    /// caller redraws unconditionally.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for RenderGate {
    fn default() -> Self {
        Self::new(DRAG_RENDER_DELAY_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::RenderGate;

    #[test]
    fn one_fire_per_window() {
        let mut gate = RenderGate::new(50);
        gate.request(0);
        gate.request(10);
        gate.request(49);
        assert!(!gate.poll(49));
        assert!(gate.poll(50));
        assert!(!gate.poll(51));
    }

    #[test]
    fn later_requests_do_not_extend_the_deadline() {
        let mut gate = RenderGate::new(50);
        gate.request(0);
        gate.request(40);
        assert!(gate.poll(50));
    }

    #[test]
    fn idle_gate_never_fires() {
        let mut gate = RenderGate::new(50);
        assert!(!gate.poll(1_000));
    }

    #[test]
    fn cancel_discards_pending_request() {
        let mut gate = RenderGate::new(50);
        gate.request(0);
        gate.cancel();
        assert!(!gate.poll(100));
        assert!(!gate.is_pending());
    }
}
