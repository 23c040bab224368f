/*!
 * Clipboard placement for llmcopy
 *
 * The finished text is handed to the first platform clipboard command that
 * accepts it. Placement happens only after the build completed, so a failed
 * or cancelled build never touches the clipboard.
 */

use std::cell::RefCell;
use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// The command is not available on the system
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Failed to execute the command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Destination for the finished text
pub trait Clipboard {
    /// Replace the clipboard contents with `text`
    fn set_contents(&self, text: &str) -> Result<()>;
}

/// Platform clipboard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardProvider {
    /// tmux paste buffer
    Tmux,
    /// X11 clipboard with xclip
    Xclip,
    /// X11 clipboard with xsel
    Xsel,
    /// Wayland clipboard
    Wayland,
    /// macOS clipboard
    MacOS,
    /// Windows clipboard (also from WSL)
    Windows,
    /// Termux clipboard
    Termux,
}

impl ClipboardProvider {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::MacOS => ("pbcopy", &[]),
            Self::Windows => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }
}

impl Clipboard for ClipboardProvider {
    fn set_contents(&self, text: &str) -> Result<()> {
        let (cmd, args) = self.command();
        execute_clipboard_command(cmd, args, text)
    }
}

/// The system clipboard, detected from the platform and running session
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    /// Try each detected provider in order until one succeeds
    fn set_contents(&self, text: &str) -> Result<()> {
        let providers = determine_clipboard_providers();
        if providers.is_empty() {
            return Err(ClipboardError::NoClipboardFound);
        }

        let mut last_error = ClipboardError::NoClipboardFound;
        for provider in providers {
            match provider.set_contents(text) {
                Ok(()) => {
                    tracing::debug!("Copied {} bytes with {:?}", text.len(), provider);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Clipboard provider {:?} failed: {}", provider, e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}

/// In-process clipboard that keeps every placed text
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RefCell<Vec<String>>,
}

impl MemoryClipboard {
    /// Most recently placed text
    pub fn last(&self) -> Option<String> {
        self.contents.borrow().last().cloned()
    }

    /// Number of placements so far
    pub fn writes(&self) -> usize {
        self.contents.borrow().len()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_contents(&self, text: &str) -> Result<()> {
        self.contents.borrow_mut().push(text.to_string());
        Ok(())
    }
}

//--------------------------------------------------------------------
// Public API
//--------------------------------------------------------------------

/// Check if a command exists on the system
pub fn command_exists(command: &str) -> bool {
    if let Some(paths) = env::var_os("PATH") {
        if env::split_paths(&paths).any(|dir| Path::new(&dir).join(command).is_file()) {
            return true;
        }
    }

    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

//--------------------------------------------------------------------
// Internal Implementation
//--------------------------------------------------------------------

fn execute_clipboard_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ClipboardError::CommandNotFound(cmd.to_string()),
            _ => ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)),
        })?;

    {
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
        })?;
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| ClipboardError::CommandFailed(format!("Failed to write to {}: {}", cmd, e)))?;
    }
    // Close stdin so the command sees end of input
    drop(child.stdin.take());

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

static PLATFORM: OnceLock<&'static str> = OnceLock::new();

fn get_platform() -> &'static str {
    PLATFORM.get_or_init(|| {
        if cfg!(target_os = "macos") {
            "macos"
        } else if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "android") {
            "android"
        } else if cfg!(target_os = "linux") {
            if env::var("WSL_DISTRO_NAME").is_ok() {
                "wsl"
            } else {
                "linux"
            }
        } else {
            "unknown"
        }
    })
}

fn determine_clipboard_providers() -> Vec<ClipboardProvider> {
    let mut providers = Vec::with_capacity(3);

    match get_platform() {
        "macos" => {
            if command_exists("pbcopy") {
                providers.push(ClipboardProvider::MacOS);
            }
        }
        "windows" | "wsl" => {
            if command_exists("clip.exe") {
                providers.push(ClipboardProvider::Windows);
            }
        }
        "linux" => {
            if env::var_os("WAYLAND_DISPLAY").is_some() && command_exists("wl-copy") {
                providers.push(ClipboardProvider::Wayland);
            }
            if env::var_os("DISPLAY").is_some() {
                if command_exists("xclip") {
                    providers.push(ClipboardProvider::Xclip);
                }
                if command_exists("xsel") {
                    providers.push(ClipboardProvider::Xsel);
                }
            }
        }
        "android" => {
            if command_exists("termux-clipboard-set") {
                providers.push(ClipboardProvider::Termux);
            }
        }
        _ => {}
    }

    // Inside tmux without a desktop clipboard the paste buffer is the best target
    if env::var_os("TMUX").is_some() && command_exists("tmux") {
        providers.push(ClipboardProvider::Tmux);
    }

    tracing::debug!("Clipboard providers for {}: {:?}", get_platform(), providers);
    providers
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("ls"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_get_platform_is_cached() {
        let platform = get_platform();
        assert!(["macos", "windows", "wsl", "linux", "android", "unknown"].contains(&platform));
        assert_eq!(platform, get_platform());
    }

    #[test]
    fn test_missing_command_is_reported() {
        let result = execute_clipboard_command("nonexistentcommandxyz", &[], "text");
        assert!(matches!(result, Err(ClipboardError::CommandNotFound(_))));
    }

    #[test]
    fn test_failing_command_is_reported() {
        let result = execute_clipboard_command("false", &[], "text");
        assert!(matches!(result, Err(ClipboardError::CommandFailed(_))));
    }

    #[test]
    fn test_memory_clipboard_keeps_writes() {
        let clipboard = MemoryClipboard::default();
        assert_eq!(clipboard.last(), None);
        clipboard.set_contents("one").unwrap();
        clipboard.set_contents("two").unwrap();
        assert_eq!(clipboard.writes(), 2);
        assert_eq!(clipboard.last().as_deref(), Some("two"));
    }

    #[test]
    #[ignore] // Requires a running tmux session
    fn test_tmux_clipboard() {
        if env::var("TMUX").is_err() || !command_exists("tmux") {
            return;
        }

        let test_text = "Test text for tmux clipboard";
        ClipboardProvider::Tmux
            .set_contents(test_text)
            .expect("Failed to copy to tmux clipboard");

        let output = Command::new("tmux")
            .args(["show-buffer"])
            .output()
            .expect("Failed to execute tmux show-buffer");
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), test_text);
    }
}
