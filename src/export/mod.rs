//! Plain-text export of a finished result, for pasting into chat or email.

use anyhow::{anyhow, Result};
use arboard::Clipboard;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};
use which::which;

use crate::session::ResultPayload;

const SUMMARY_HEADER: &str = "📋 MEETING SUMMARY";
const ACTIONS_HEADER: &str = "✅ ACTION ITEMS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportSection {
    Summary,
    Actions,
}

impl ExportSection {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Summary => "Summary",
            Self::Actions => "Action items",
        }
    }
}

pub fn format_summary(result: &ResultPayload) -> String {
    let lines: Vec<String> = result
        .summary_points
        .iter()
        .map(|point| format!("• {}", point))
        .collect();
    format!("{}\n\n{}", SUMMARY_HEADER, lines.join("\n"))
}

pub fn format_action_items(result: &ResultPayload) -> String {
    let lines: Vec<String> = result
        .action_items
        .iter()
        .map(|item| match &item.deadline {
            Some(deadline) => format!("• {} (Due: {})", item.task, deadline),
            None => format!("• {}", item.task),
        })
        .collect();
    format!("{}\n\n{}", ACTIONS_HEADER, lines.join("\n"))
}

pub fn format_section(result: &ResultPayload, section: ExportSection) -> String {
    match section {
        ExportSection::Summary => format_summary(result),
        ExportSection::Actions => format_action_items(result),
    }
}

/// Where a copy is attempted, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CopyStrategy {
    /// wl-copy, xclip or xsel. These fork and keep serving the selection
    /// after this process exits.
    SystemTools,
    /// arboard, owned by this process.
    Native,
}

fn copy_strategies() -> &'static [CopyStrategy] {
    if cfg!(target_os = "linux") {
        &[CopyStrategy::SystemTools, CopyStrategy::Native]
    } else {
        &[CopyStrategy::Native, CopyStrategy::SystemTools]
    }
}

/// Copy text to the system clipboard so it survives this process exiting.
///
/// On Linux the selection belongs to whoever set it, so the forking command
/// line tools are preferred. The native fallback blocks until another
/// application takes the clipboard over.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    info!("Copying {} chars to clipboard", text.chars().count());

    for strategy in copy_strategies() {
        match strategy {
            CopyStrategy::SystemTools => {
                if let Some(name) = copy_with_system_tools(text) {
                    debug!("Text copied to clipboard with {}", name);
                    return Ok(());
                }
            }
            CopyStrategy::Native => match copy_native(text) {
                Ok(()) => return Ok(()),
                Err(err) => warn!("Native clipboard backend failed ({})", err),
            },
        }
    }

    Err(anyhow!("No clipboard backend (native, wl-copy, xclip, xsel) available"))
}

#[cfg(target_os = "linux")]
fn copy_native(text: &str) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    let mut clipboard = Clipboard::new()?;
    info!("Holding clipboard contents until another application copies");
    clipboard.set().wait().text(text)
}

#[cfg(not(target_os = "linux"))]
fn copy_native(text: &str) -> Result<(), arboard::Error> {
    Clipboard::new()?.set_text(text)
}

fn copy_with_system_tools(text: &str) -> Option<&'static str> {
    CLIPBOARD_BACKENDS
        .iter()
        .filter(|backend| which(backend.copy_cmd).is_ok())
        .find(|backend| match pipe_to_command(backend.copy_cmd, backend.copy_args, text) {
            Ok(true) => true,
            Ok(false) => {
                warn!("{} did not accept the clipboard contents", backend.name);
                false
            }
            Err(err) => {
                warn!("Failed to run {}: {}", backend.name, err);
                false
            }
        })
        .map(|backend| backend.name)
}

/// Feed `text` to a command's stdin. True only if every byte was written and
/// the command exited successfully. The child is always reaped.
fn pipe_to_command(cmd: &str, args: &[&str], text: &str) -> Result<bool> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .spawn()?;

    let written = match child.stdin.take() {
        // dropping stdin closes it so the tool sees EOF
        Some(mut stdin) => stdin.write_all(text.as_bytes()).is_ok(),
        None => false,
    };

    let status = child.wait()?;
    Ok(written && status.success())
}

struct ClipboardBackend {
    name: &'static str,
    copy_cmd: &'static str,
    copy_args: &'static [&'static str],
}

const CLIPBOARD_BACKENDS: &[ClipboardBackend] = &[
    ClipboardBackend {
        name: "wl-copy",
        copy_cmd: "wl-copy",
        copy_args: &[],
    },
    ClipboardBackend {
        name: "xclip",
        copy_cmd: "xclip",
        copy_args: &["-selection", "clipboard"],
    },
    ClipboardBackend {
        name: "xsel",
        copy_cmd: "xsel",
        copy_args: &["--clipboard", "--input"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ActionItem;

    fn result() -> ResultPayload {
        ResultPayload {
            summary_points: vec![
                "Budget approved".to_string(),
                "Launch moved to July".to_string(),
            ],
            action_items: vec![
                ActionItem::new("Update roadmap", Some("June 30, 2025")),
                ActionItem::new("Tell support", None),
            ],
        }
    }

    #[test]
    fn test_format_summary() {
        assert_eq!(
            format_summary(&result()),
            "📋 MEETING SUMMARY\n\n• Budget approved\n• Launch moved to July"
        );
    }

    #[test]
    fn test_format_action_items_with_and_without_deadline() {
        assert_eq!(
            format_action_items(&result()),
            "✅ ACTION ITEMS\n\n• Update roadmap (Due: June 30, 2025)\n• Tell support"
        );
    }

    #[test]
    fn test_format_section_dispatch() {
        let result = result();
        assert_eq!(
            format_section(&result, ExportSection::Summary),
            format_summary(&result)
        );
        assert_eq!(
            format_section(&result, ExportSection::Actions),
            format_action_items(&result)
        );
    }

    #[test]
    fn test_forking_tools_come_first_on_linux() {
        let strategies = copy_strategies();
        assert_eq!(strategies.len(), 2);
        if cfg!(target_os = "linux") {
            assert_eq!(strategies[0], CopyStrategy::SystemTools);
        } else {
            assert_eq!(strategies[0], CopyStrategy::Native);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_to_command_feeds_stdin() {
        assert!(pipe_to_command("cat", &[], "Budget approved").unwrap());
        assert!(!pipe_to_command("false", &[], "Budget approved").unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_to_command_fails_when_tool_stops_reading() {
        // larger than a pipe buffer, and `true` exits without reading
        let text = "x".repeat(4 * 1024 * 1024);
        assert!(!pipe_to_command("true", &[], &text).unwrap());
    }

    #[test]
    fn test_pipe_to_command_missing_binary() {
        assert!(pipe_to_command("notegenius-no-such-tool", &[], "x").is_err());
    }

    #[test]
    fn test_section_deserializes_lowercase() {
        let section: ExportSection = serde_json::from_str("\"actions\"").unwrap();
        assert_eq!(section, ExportSection::Actions);
        assert_eq!(section.title(), "Action items");
    }
}
