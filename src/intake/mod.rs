//! Input acceptance rules applied before anything reaches the session machine.
//!
//! Rejections carry the message shown to the user; nothing here touches
//! session state.

use anyhow::{Context, Result};
use std::path::Path;
use thiserror::Error;

use crate::session::{AudioInput, TextInput};

pub const ACCEPTED_AUDIO_TYPES: [&str; 3] = ["audio/mpeg", "audio/wav", "audio/mp3"];
pub const MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;
pub const MAX_TEXT_CHARS: usize = 15_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Please upload an audio file (MP3 or WAV)")]
    UnsupportedAudioType { mime_type: String },
    #[error("File size exceeds 25MB limit")]
    AudioTooLarge { size_bytes: u64 },
    #[error("Please enter some meeting notes")]
    EmptyText,
    #[error("Text exceeds 15,000 character limit")]
    TextTooLong { chars: usize },
}

pub fn validate_audio(audio: AudioInput) -> Result<AudioInput, IntakeError> {
    if !ACCEPTED_AUDIO_TYPES.contains(&audio.mime_type.as_str()) {
        return Err(IntakeError::UnsupportedAudioType {
            mime_type: audio.mime_type,
        });
    }

    if audio.size_bytes > MAX_AUDIO_BYTES {
        return Err(IntakeError::AudioTooLarge {
            size_bytes: audio.size_bytes,
        });
    }

    Ok(audio)
}

/// Accepts meeting notes and returns them trimmed.
///
/// The length limit applies to the text as typed, before trimming.
pub fn validate_text(text: &str) -> Result<TextInput, IntakeError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::EmptyText);
    }

    let chars = text.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(IntakeError::TextTooLong { chars });
    }

    Ok(TextInput {
        content: trimmed.to_string(),
    })
}

pub fn mime_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "opus" => "audio/opus",
        _ => "application/octet-stream",
    }
}

/// Read audio metadata from a local file. The result is not yet validated.
pub fn audio_from_path(path: &Path) -> Result<AudioInput> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("File not found: {}", path.display()))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    Ok(AudioInput {
        name,
        size_bytes: metadata.len(),
        mime_type: mime_type_for_extension(&ext).to_string(),
        source: Some(path.to_path_buf()),
    })
}
