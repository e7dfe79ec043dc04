use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Stdio};

/// Runs `cmd` through the platform shell and reports whether it exited with
/// status zero. stdout is discarded unless `show_progress` is set; stderr
/// always reaches the terminal.
pub fn run_command(cmd: &str, show_progress: bool, env: Option<&HashMap<String, String>>) -> bool {
    let mut command = shell_command(cmd);
    if !show_progress {
        command.stdout(Stdio::null());
    }
    if let Some(vars) = env {
        command.envs(vars);
    }

    match command.status() {
        Ok(status) if status.success() => true,
        Ok(status) => {
            crate::utils::logger::error(&format!("command returned {}: {}", status, cmd));
            false
        }
        Err(e) => {
            crate::utils::logger::error(&format!("command failed to start: {} ({})", cmd, e));
            false
        }
    }
}

#[cfg(windows)]
fn shell_command(cmd: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(cmd);
    command
}

#[cfg(not(windows))]
fn shell_command(cmd: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd);
    command
}

/// Quotes a path so the shell hands it over as a single word.
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy())
}

#[cfg(not(windows))]
pub fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/_.-+:=%,@".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

#[cfg(windows)]
pub fn quote(word: &str) -> String {
    if word.is_empty() || word.contains([' ', '&', '(', ')', '^', '<', '>', '|']) {
        format!("\"{}\"", word)
    } else {
        word.to_string()
    }
}
