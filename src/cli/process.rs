//! CLI handler for processing a single recording or set of notes.
//!
//! Runs one session locally, mirrors its progress on a progress bar, and
//! prints the summary and action items.

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::time::sleep;

use crate::app::build_machine;
use crate::cli::args::ProcessCliArgs;
use crate::config::Config;
use crate::export::{self, ExportSection};
use crate::intake;
use crate::session::{InputReference, ResultPayload, SessionMachine, SessionState, Stage};

const POLL_INTERVAL_MS: u64 = 100;

/// Handle the process CLI command.
pub async fn handle_process_command(args: ProcessCliArgs, config: &Config) -> Result<()> {
    let machine = build_machine(config)?;

    // 1. Validate and submit
    if let Some(path) = &args.file {
        let audio = intake::audio_from_path(path)?;
        let audio = intake::validate_audio(audio)?;
        eprintln!("Processing your audio file: {}", audio.name);
        machine.submit_audio(audio).await?;
    } else {
        let raw = match (&args.text, &args.text_file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read notes from {}", path.display()))?,
            (None, None) => bail!("Provide an audio file, --text or --text-file"),
        };
        let text = intake::validate_text(&raw)?;
        eprintln!("Processing your meeting notes");
        machine.submit_text(text).await?;
    }

    // 2. Follow progress until the run finishes
    let pb = if args.no_progress {
        None
    } else {
        Some(create_progress_bar())
    };
    let result = wait_for_result(&machine, pb.as_ref()).await;

    if let Some(pb) = pb {
        match &result {
            Ok(_) => pb.finish_with_message("Complete"),
            Err(_) => pb.abandon_with_message("Failed"),
        }
    }
    let result = result?;

    // 3. Output
    println!("{}", export::format_summary(&result));
    println!();
    println!("{}", export::format_action_items(&result));

    if let Some(section) = args.copy {
        copy_section(&result, section)?;
    }

    Ok(())
}

async fn wait_for_result(
    machine: &SessionMachine,
    pb: Option<&ProgressBar>,
) -> Result<ResultPayload> {
    loop {
        let state = machine.snapshot().await;

        if let Some(pb) = pb {
            pb.set_position(state.progress.floor() as u64);
            if let Some(message) = progress_message(&state) {
                pb.set_message(message);
            }
        }

        match state.stage {
            Stage::Processing => sleep(Duration::from_millis(POLL_INTERVAL_MS)).await,
            Stage::Complete => {
                return state
                    .result
                    .ok_or_else(|| anyhow!("Run completed but no result available"));
            }
            Stage::Failed => bail!(
                "Processing failed: {}",
                state
                    .last_error
                    .unwrap_or_else(|| "Unknown error".to_string())
            ),
            Stage::Idle => bail!("Session was reset before it finished"),
        }
    }
}

fn progress_message(state: &SessionState) -> Option<String> {
    let label = state.stage_label()?;
    let message = match state.input.as_ref().and_then(InputReference::display_name) {
        Some(name) => format!("{}... File: {}", label, name),
        None => format!("{}...", label),
    };
    Some(message)
}

fn copy_section(result: &ResultPayload, section: ExportSection) -> Result<()> {
    export::copy_to_clipboard(&export::format_section(result, section))?;
    eprintln!("{} copied to clipboard", section.title());
    Ok(())
}

/// Create a styled progress bar.
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸━"),
    );
    pb.set_message("Analyzing...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
