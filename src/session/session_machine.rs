//! Session lifecycle orchestrator.
//!
//! Drives one run at a time:
//! submit → tick progress to 100 → settle → produce result → complete
//!
//! The producer and the progress random source are injected, so the machine
//! never knows which summarization engine it is talking to.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval_at, sleep, timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::summary::ResultProducer;

use super::progress::{next_progress, stage_label, ProgressRandom};
use super::status::{
    Advance, AudioInput, InputReference, ResultPayload, RunTicket, SessionState,
    SessionStatusHandle, Stage, TextInput,
};

/// Shortest tick a run will use; tokio intervals reject a zero period.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session is {}; reset it before submitting again", .stage.as_str())]
    Busy { stage: Stage },
}

/// Timing knobs for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    pub tick_interval: Duration,
    pub settle_delay: Duration,
    pub producer_timeout: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SessionTiming {
    fn from(config: &SessionConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            settle_delay: config.settle_delay(),
            producer_timeout: config.producer_timeout(),
        }
    }
}

pub struct SessionMachine {
    producer: Arc<dyn ResultProducer>,
    random: Arc<dyn ProgressRandom>,
    timing: SessionTiming,
    status: SessionStatusHandle,
    shutdown: CancellationToken,
}

impl SessionMachine {
    pub fn new(
        producer: Arc<dyn ResultProducer>,
        random: Arc<dyn ProgressRandom>,
        timing: SessionTiming,
        status: SessionStatusHandle,
    ) -> Self {
        Self {
            producer,
            random,
            timing,
            status,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn status(&self) -> SessionStatusHandle {
        self.status.clone()
    }

    /// Start processing an accepted audio upload. Returns the new run's id.
    pub async fn submit_audio(&self, audio: AudioInput) -> Result<Uuid, SessionError> {
        self.submit(InputReference::Audio(audio)).await
    }

    /// Start processing accepted meeting notes. Returns the new run's id.
    pub async fn submit_text(&self, text: TextInput) -> Result<Uuid, SessionError> {
        self.submit(InputReference::Text(text)).await
    }

    async fn submit(&self, input: InputReference) -> Result<Uuid, SessionError> {
        let kind = input.kind();
        let ticket = match self
            .status
            .begin(input.clone(), self.shutdown.child_token())
            .await
        {
            Ok(ticket) => ticket,
            Err(stage) => {
                warn!("Rejected {} submission while {}", kind, stage.as_str());
                return Err(SessionError::Busy { stage });
            }
        };

        info!("Run {} started for {} input", ticket.run_id, kind);

        let run_id = ticket.run_id;
        tokio::spawn(drive_run(
            self.status.clone(),
            Arc::clone(&self.producer),
            Arc::clone(&self.random),
            self.timing,
            ticket,
            input,
        ));

        Ok(run_id)
    }

    /// Return to idle from any stage, cancelling the in-flight run.
    pub async fn reset(&self) {
        let previous = self.status.reset().await;
        info!("Session reset from {}", previous.as_str());
    }

    pub async fn observe_stage(&self) -> Stage {
        self.status.get().await.stage
    }

    pub async fn observe_progress(&self) -> f64 {
        self.status.get().await.progress
    }

    pub async fn observe_result(&self) -> Option<ResultPayload> {
        self.status.get().await.result
    }

    pub async fn snapshot(&self) -> SessionState {
        self.status.get().await
    }
}

impl Drop for SessionMachine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn drive_run(
    status: SessionStatusHandle,
    producer: Arc<dyn ResultProducer>,
    random: Arc<dyn ProgressRandom>,
    timing: SessionTiming,
    ticket: RunTicket,
    input: InputReference,
) {
    let RunTicket {
        generation,
        run_id,
        cancel,
    } = ticket;

    let tick = timing.tick_interval.max(MIN_TICK_INTERVAL);
    let mut ticker = interval_at(Instant::now() + tick, tick);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Run {} cancelled while ticking", run_id);
                return;
            }
            _ = ticker.tick() => {}
        }

        let sample = random.next_unit();
        match status.advance(generation, |p| next_progress(p, sample)).await {
            Advance::Ticked(progress) => {
                debug!(
                    "Run {} progress {:.1}% ({})",
                    run_id,
                    progress,
                    stage_label(progress)
                );
            }
            Advance::Reached => break,
            Advance::Stale => return,
        }
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Run {} cancelled while settling", run_id);
            return;
        }
        _ = sleep(timing.settle_delay) => {}
    }

    if !status.is_current(generation).await {
        return;
    }

    info!("Run {} settled, producing result with {}", run_id, producer.name());

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            info!("Run {} cancelled during result production", run_id);
            return;
        }
        outcome = timeout(timing.producer_timeout, producer.produce(&input)) => outcome,
    };

    match outcome {
        Ok(Ok(result)) => {
            let points = result.summary_points.len();
            let actions = result.action_items.len();
            if status.complete(generation, result).await {
                info!(
                    "Run {} complete: {} summary points, {} action items",
                    run_id, points, actions
                );
            }
        }
        Ok(Err(e)) => {
            error!("Run {} result production failed: {}", run_id, e);
            status.fail(generation, e.to_string()).await;
        }
        Err(_) => {
            let message = format!(
                "Result production timed out after {:?}",
                timing.producer_timeout
            );
            error!("Run {}: {}", run_id, message);
            status.fail(generation, message).await;
        }
    }
}
