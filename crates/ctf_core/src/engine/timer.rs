/// One-shot countdown driven by the host tick.
///
/// Replaces wall-clock scheduling: the controller owns the timer and fires
/// the pending action on the tick where it expires, so nothing can run after
/// the controller is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Countdown {
    remaining: Option<f32>,
}

impl Countdown {
    /// Arm (or re-arm) the countdown.
    pub fn start(&mut self, seconds: f32) {
        self.remaining = Some(seconds.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Returns `true` exactly once, on the tick the countdown expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.remaining.as_mut() {
            Some(left) => {
                *left -= dt;
                if *left <= 0.0 {
                    self.remaining = None;
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }
}
