use std::time::Duration;

/// How long the client waits after each successful response before the
/// caller may issue the next request.
pub trait RequestDelay: Send + Sync {
    fn delay_after_request(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl RequestDelay for FixedDelay {
    fn delay_after_request(&self) -> Duration {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl RequestDelay for NoDelay {
    fn delay_after_request(&self) -> Duration {
        Duration::ZERO
    }
}
