//! Heartbeat bookkeeping
//!
//! One heartbeat per interval; the ack for it has to arrive before the next
//! tick or the connection is considered a zombie.

use std::time::Duration;

use tokio::time::Instant;

/// What to do on a heartbeat tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// Previous heartbeat was acknowledged; send the next one
    Send,
    /// Previous heartbeat is still unacknowledged
    Missed,
}

/// Tracks heartbeat timing for one connection
#[derive(Debug)]
pub struct Heartbeater {
    interval: Duration,
    awaiting_ack: bool,
    last_sent: Option<Instant>,
    latency: Option<Duration>,
}

impl Heartbeater {
    /// Start tracking with the interval from HELLO
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            awaiting_ack: false,
            last_sent: None,
            latency: None,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Called when the interval elapses
    pub fn tick(&mut self) -> Beat {
        if self.awaiting_ack {
            return Beat::Missed;
        }
        self.sent();
        Beat::Send
    }

    /// Record a heartbeat sent outside the regular schedule
    pub fn sent(&mut self) {
        self.awaiting_ack = true;
        self.last_sent = Some(Instant::now());
    }

    /// Record an ack (op 11)
    pub fn ack(&mut self) {
        self.awaiting_ack = false;
        self.latency = self.last_sent.map(|sent| sent.elapsed());
    }

    /// Round trip of the last acknowledged heartbeat
    pub const fn latency(&self) -> Option<Duration> {
        self.latency
    }

    pub const fn is_awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }
}
