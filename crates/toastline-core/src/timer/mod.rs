mod clock;
mod queue;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use queue::{TimerHandle, TimerQueue, TimerToken, Wakeup};
