use crate::state::Engine;
use crate::types::SessionId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Cancellation handle shared between a session and its clock task
#[derive(Debug, Clone, Default)]
pub struct RoundClock {
    cancelled: Arc<AtomicBool>,
}

impl RoundClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Spawn the background task that drives one session through its phases.
///
/// Every tick the task compares the time spent in the current phase against the
/// phase's dwell and checks the early-exit condition; either one requests a
/// transition away from the phase it observed. Player actions may have moved
/// the session on in the meantime, in which case the request is a no-op.
pub fn spawn_round_clock(engine: Arc<Engine>, session_id: SessionId, clock: RoundClock) -> JoinHandle<()> {
    let tick = engine.config().tick;

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tick).await;

            if clock.is_cancelled() {
                break;
            }

            let handle = match engine.session_handle(&session_id).await {
                Ok(h) => h,
                Err(_) => break,
            };

            let (phase, due) = {
                let session = handle.read().await;
                let dwell = engine.config().durations.max_dwell(session.phase);
                let timed_out = session.phase_elapsed() >= dwell;
                (session.phase, timed_out || session.early_exit_ready())
            };

            if !due {
                continue;
            }

            match engine.advance(&session_id, phase).await {
                Ok(true) => {
                    tracing::debug!("Clock advanced session {} out of {:?}", session_id, phase)
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        "Clock failed to advance session {} out of {:?}: {}",
                        session_id,
                        phase,
                        e
                    );
                }
            }
        }

        tracing::debug!("Clock for session {} stopped", session_id);
    })
}
