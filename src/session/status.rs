//! Session status types and shared state handle.
//!
//! Every write made on behalf of a run carries the run's generation. Once
//! `reset` (or a newer run) bumps the generation, writes from the old run
//! are dropped.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::progress::{self, MAX_PROGRESS};

/// Lifecycle stage of a processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Processing,
    Complete,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

/// Metadata of an uploaded audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInput {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    /// Local file the metadata was read from, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub content: String,
}

/// The user-supplied input bound to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputReference {
    Audio(AudioInput),
    Text(TextInput),
}

impl InputReference {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Audio(_) => "audio",
            Self::Text(_) => "text",
        }
    }

    /// File name shown next to the progress bar. Text input has none.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Self::Audio(audio) => Some(&audio.name),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl ActionItem {
    pub fn new(task: impl Into<String>, deadline: Option<&str>) -> Self {
        Self {
            task: task.into(),
            deadline: deadline.map(str::to_string),
        }
    }
}

/// Structured output of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub summary_points: Vec<String>,
    pub action_items: Vec<ActionItem>,
}

/// Current session state, readable by API handlers and the CLI.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub stage: Stage,
    pub input: Option<InputReference>,
    pub progress: f64,
    pub result: Option<ResultPayload>,
    pub last_error: Option<String>,
    pub run_id: Option<Uuid>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            input: None,
            progress: 0.0,
            result: None,
            last_error: None,
            run_id: None,
            started_at: None,
            generation: 0,
            cancel: None,
        }
    }
}

impl SessionState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sub-phase label for the progress view. Only meaningful while processing.
    pub fn stage_label(&self) -> Option<&'static str> {
        match self.stage {
            Stage::Processing => Some(progress::stage_label(self.progress)),
            Stage::Idle | Stage::Complete | Stage::Failed => None,
        }
    }
}

/// A freshly started run, handed to the task that drives it.
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub generation: u64,
    pub run_id: Uuid,
    pub cancel: CancellationToken,
}

/// What a progress write did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Progress moved; the run keeps ticking.
    Ticked(f64),
    /// Progress hit 100; ticking must stop.
    Reached,
    /// The run is no longer current.
    Stale,
}

/// Thread-safe handle for sharing session state between the machine, its run
/// tasks and API handlers.
#[derive(Clone, Default)]
pub struct SessionStatusHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionStatusHandle {
    pub async fn get(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    /// Start a run if the session is idle. Returns the current stage otherwise.
    pub async fn begin(
        &self,
        input: InputReference,
        cancel: CancellationToken,
    ) -> Result<RunTicket, Stage> {
        let mut state = self.inner.lock().await;
        if state.stage != Stage::Idle {
            return Err(state.stage);
        }

        state.generation += 1;
        let run_id = Uuid::new_v4();
        state.stage = Stage::Processing;
        state.input = Some(input);
        state.progress = 0.0;
        state.result = None;
        state.last_error = None;
        state.run_id = Some(run_id);
        state.started_at = Some(chrono::Utc::now());
        state.cancel = Some(cancel.clone());

        Ok(RunTicket {
            generation: state.generation,
            run_id,
            cancel,
        })
    }

    /// Apply one progress step computed from the current value.
    pub async fn advance<F>(&self, generation: u64, step: F) -> Advance
    where
        F: FnOnce(f64) -> f64,
    {
        let mut state = self.inner.lock().await;
        if state.generation != generation || state.stage != Stage::Processing {
            return Advance::Stale;
        }

        let next = step(state.progress).clamp(state.progress, MAX_PROGRESS);
        state.progress = next;
        if next >= MAX_PROGRESS {
            Advance::Reached
        } else {
            Advance::Ticked(next)
        }
    }

    pub async fn is_current(&self, generation: u64) -> bool {
        let state = self.inner.lock().await;
        state.generation == generation && state.stage == Stage::Processing
    }

    /// Returns false when the run was superseded and nothing was written.
    pub async fn complete(&self, generation: u64, result: ResultPayload) -> bool {
        let mut state = self.inner.lock().await;
        if state.generation != generation || state.stage != Stage::Processing {
            return false;
        }
        state.stage = Stage::Complete;
        state.progress = MAX_PROGRESS;
        state.result = Some(result);
        state.cancel = None;
        true
    }

    /// Returns false when the run was superseded and nothing was written.
    pub async fn fail(&self, generation: u64, error: String) -> bool {
        let mut state = self.inner.lock().await;
        if state.generation != generation || state.stage != Stage::Processing {
            return false;
        }
        state.stage = Stage::Failed;
        state.result = None;
        state.last_error = Some(error);
        state.cancel = None;
        true
    }

    /// Return to idle, invalidating and cancelling whatever run was in flight.
    pub async fn reset(&self) -> Stage {
        let mut state = self.inner.lock().await;
        let previous = state.stage;
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
        }
        let generation = state.generation + 1;
        *state = SessionState {
            generation,
            ..SessionState::default()
        };
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_input() -> InputReference {
        InputReference::Text(TextInput {
            content: "Standup notes".to_string(),
        })
    }

    fn payload() -> ResultPayload {
        ResultPayload {
            summary_points: vec!["Shipped the release".to_string()],
            action_items: vec![ActionItem::new("Write changelog", None)],
        }
    }

    #[test]
    fn test_stage_as_str() {
        assert_eq!(Stage::Idle.as_str(), "idle");
        assert_eq!(Stage::Processing.as_str(), "processing");
        assert_eq!(Stage::Complete.as_str(), "complete");
        assert_eq!(Stage::Failed.as_str(), "failed");
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&Stage::Processing).unwrap();
        assert_eq!(json, "\"processing\"");

        let parsed: Stage = serde_json::from_str("\"complete\"").unwrap();
        assert_eq!(parsed, Stage::Complete);
    }

    #[test]
    fn test_input_reference_is_tagged() {
        let audio = InputReference::Audio(AudioInput {
            name: "standup.mp3".to_string(),
            size_bytes: 1024,
            mime_type: "audio/mpeg".to_string(),
            source: None,
        });
        let json = serde_json::to_value(&audio).unwrap();
        assert_eq!(json["kind"], "audio");
        assert_eq!(json["size_bytes"], 1024);
        assert!(json.get("source").is_none());
        assert_eq!(audio.display_name(), Some("standup.mp3"));
        assert_eq!(text_input().display_name(), None);
    }

    #[test]
    fn test_action_item_without_deadline_omits_field() {
        let item = ActionItem::new("Book room", None);
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("deadline").is_none());
    }

    #[test]
    fn test_session_state_default() {
        let state = SessionState::default();
        assert_eq!(state.stage, Stage::Idle);
        assert!(state.input.is_none());
        assert_eq!(state.progress, 0.0);
        assert!(state.result.is_none());
        assert!(state.run_id.is_none());
        assert!(state.stage_label().is_none());
    }

    #[tokio::test]
    async fn test_begin_rejects_when_not_idle() {
        let handle = SessionStatusHandle::default();
        handle
            .begin(text_input(), CancellationToken::new())
            .await
            .unwrap();

        let second = handle
            .begin(
                InputReference::Text(TextInput {
                    content: "other".to_string(),
                }),
                CancellationToken::new(),
            )
            .await;
        assert_eq!(second.unwrap_err(), Stage::Processing);
        assert_eq!(handle.get().await.input, Some(text_input()));
    }

    #[tokio::test]
    async fn test_advance_never_decreases_or_overshoots() {
        let handle = SessionStatusHandle::default();
        let ticket = handle
            .begin(text_input(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            handle.advance(ticket.generation, |p| p + 40.0).await,
            Advance::Ticked(40.0)
        );
        assert_eq!(
            handle.advance(ticket.generation, |p| p - 10.0).await,
            Advance::Ticked(40.0)
        );
        assert_eq!(
            handle.advance(ticket.generation, |p| p + 500.0).await,
            Advance::Reached
        );
        assert_eq!(handle.get().await.progress, 100.0);
    }

    #[tokio::test]
    async fn test_reset_invalidates_generation_and_cancels() {
        let handle = SessionStatusHandle::default();
        let ticket = handle
            .begin(text_input(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(handle.reset().await, Stage::Processing);
        assert!(ticket.cancel.is_cancelled());
        assert_eq!(
            handle.advance(ticket.generation, |p| p + 10.0).await,
            Advance::Stale
        );
        assert!(!handle.complete(ticket.generation, payload()).await);

        let state = handle.get().await;
        assert_eq!(state.stage, Stage::Idle);
        assert_eq!(state.progress, 0.0);
        assert!(state.input.is_none());
        assert!(state.result.is_none());
        assert!(state.generation() > ticket.generation);
    }

    #[tokio::test]
    async fn test_complete_sets_result_only_when_complete() {
        let handle = SessionStatusHandle::default();
        let ticket = handle
            .begin(text_input(), CancellationToken::new())
            .await
            .unwrap();
        assert!(handle.get().await.result.is_none());

        assert!(handle.complete(ticket.generation, payload()).await);
        let state = handle.get().await;
        assert_eq!(state.stage, Stage::Complete);
        assert_eq!(state.progress, 100.0);
        assert_eq!(state.result, Some(payload()));
    }

    #[tokio::test]
    async fn test_fail_records_error() {
        let handle = SessionStatusHandle::default();
        let ticket = handle
            .begin(text_input(), CancellationToken::new())
            .await
            .unwrap();

        assert!(handle.fail(ticket.generation, "backend down".to_string()).await);
        let state = handle.get().await;
        assert_eq!(state.stage, Stage::Failed);
        assert!(state.result.is_none());
        assert_eq!(state.last_error, Some("backend down".to_string()));

        handle.reset().await;
        assert!(handle.get().await.last_error.is_none());
    }
}
