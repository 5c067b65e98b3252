//! Processing session module.
//!
//! Owns the lifecycle of a single run: accepting an input, simulating
//! progress, and assembling the summary and action items at the end.

pub mod progress;
pub mod session_machine;
pub mod status;

pub use progress::{next_progress, stage_label, ProgressRandom, ScriptedRandom, ThreadRandom};
pub use session_machine::{SessionError, SessionMachine, SessionTiming};
pub use status::{
    ActionItem, AudioInput, InputReference, ResultPayload, SessionState, SessionStatusHandle,
    Stage, TextInput,
};
