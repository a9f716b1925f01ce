//! Gravity timer task
//!
//! Follows the directive published by the session actor and feeds
//! `TickElapsed` back into the actor's intent queue. Each tick carries the
//! epoch it was armed under so the actor can drop ticks that were already
//! queued when the timer was re-armed.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::core::TimerDirective;
use crate::store::Command;

/// Spawn the timer. It exits when the directive channel or the queue closes.
///
/// Holds only a weak handle on the queue so it never keeps the actor alive.
pub(crate) fn spawn_timer(
    mut directives: watch::Receiver<TimerDirective>,
    queue: mpsc::WeakSender<Command>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let directive = *directives.borrow_and_update();
            let TimerDirective::Armed { interval, epoch } = directive else {
                if directives.changed().await.is_err() {
                    return;
                }
                continue;
            };

            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let Some(queue) = queue.upgrade() else {
                            return;
                        };
                        if queue.send(Command::Tick { epoch }).await.is_err() {
                            return;
                        }
                    }
                    changed = directives.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        break;
                    }
                }
            }
        }
    })
}
