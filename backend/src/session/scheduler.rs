//! Deferred work for the game server
//!
//! Timers never touch session state themselves. When one fires it is sent
//! back to the manager, which checks under the lock that the situation that
//! armed it still holds before acting.

use super::state::ConnectionId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    /// Seat a bot opposite a player still waiting in the queue since `queued_at`
    BotFallback {
        connection: ConnectionId,
        queued_at: Instant,
    },
    /// Let the bot answer, if the game has not moved on since
    BotMove { game_id: String, move_count: usize },
    /// Forget a finished game
    GameCleanup { game_id: String },
    /// Forfeit disconnected players whose grace ran out
    DisconnectSweep,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Timer>,
}

impl Scheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Timer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver `timer` once after `delay`
    pub fn schedule(&self, delay: Duration, timer: Timer) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(timer);
        });
    }

    /// Deliver `timer` every `period`, first after one full period.
    /// Stops when the receiving side is gone.
    pub fn every(&self, period: Duration, timer: Timer) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(timer.clone()).is_err() {
                    break;
                }
            }
        });
    }
}
