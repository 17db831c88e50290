//! Client heartbeat timer.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Picks the heartbeat period: the server's value when usable, otherwise
/// `fallback`. Zero is not usable.
pub fn resolve_interval(advertised_ms: Option<u64>, fallback: Duration) -> Duration {
    match advertised_ms {
        Some(ms) if ms > 0 => Duration::from_millis(ms),
        _ => fallback,
    }
}

/// Fires once per period, the first time one full period after start.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Interval,
    period: Duration,
}

impl Heartbeat {
    /// Starts a timer with the given period.
    pub fn start(period: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, period }
    }

    /// Waits for the next tick.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// The period this timer was started with.
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Waits for the next tick of `heartbeat`, or forever when there is none.
pub async fn next_beat(heartbeat: &mut Option<Heartbeat>) {
    match heartbeat {
        Some(hb) => hb.tick().await,
        None => std::future::pending().await,
    }
}
