//! Desktop platform detection
//!
//! Picks which external tools talk to the clipboard and synthesize keystrokes.

use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Wayland,
    X11,
}

impl Platform {
    /// Detect the running desktop session
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            Platform::Wayland
        } else {
            Platform::X11
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::MacOs => "macos",
            Platform::Wayland => "wayland",
            Platform::X11 => "x11",
        };
        f.write_str(name)
    }
}

/// Run a program with an argument array and return its stdout.
///
/// Nothing is passed through a shell, so arguments are never re-parsed.
pub(crate) async fn run_capture(program: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn {}: {}", program, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a program, feeding `input` on stdin.
///
/// stdout/stderr are discarded: clipboard owners like `xclip` and `wl-copy`
/// fork a server that keeps inherited pipes open.
pub(crate) async fn run_with_stdin(program: &str, args: &[&str], input: &str) -> anyhow::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to spawn {}: {}", program, e))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
        stdin.flush().await?;
    }

    let status = child.wait().await?;
    if !status.success() {
        return Err(anyhow::anyhow!("{} exited with {}", program, status));
    }
    Ok(())
}

/// Run a program and only check its exit status
pub(crate) async fn run_status(program: &str, args: &[&str]) -> anyhow::Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to spawn {}: {}", program, e))?;

    if !status.success() {
        return Err(anyhow::anyhow!("{} exited with {}", program, status));
    }
    Ok(())
}
