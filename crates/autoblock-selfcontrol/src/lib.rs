//! autoblock-selfcontrol: Driving the SelfControl application.
//!
//! Preference writes go through `defaults` running as the target user, the
//! same store SelfControl itself reads. Nothing here interprets the
//! schedule; callers hand in the duration and host list they want applied.

use std::path::Path;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::{debug, info};

/// SelfControl's preference domain.
pub const DEFAULTS_DOMAIN: &str = "org.eyebeam.SelfControl";

/// While no block is running, SelfControl parks BlockStartedDate at the
/// distant future rather than deleting the key.
const DISTANT_FUTURE_YEAR: &str = "4001";

#[derive(Debug, Error)]
pub enum SelfControlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`{command}` exited with {status}")]
    CommandFailed { command: String, status: ExitStatus },
    #[error("unknown macOS user '{0}'")]
    UnknownUser(String),
}

/// A preference value `defaults write` understands.
#[derive(Debug, Clone)]
pub enum DefaultsValue<'a> {
    Int(i64),
    Array(&'a [String]),
    /// The current local time, for legacy-mode BlockStartedDate.
    DateNow,
}

/// Write one SelfControl preference for the given user.
pub fn write_default(
    username: &str,
    key: &str,
    value: DefaultsValue<'_>,
) -> Result<(), SelfControlError> {
    let mut cmd = Command::new("sudo");
    cmd.args(["-u", username, "defaults", "write", DEFAULTS_DOMAIN, key]);
    match value {
        DefaultsValue::Int(n) => {
            cmd.arg("-int").arg(n.to_string());
        }
        DefaultsValue::Array(items) => {
            cmd.arg("-array");
            cmd.args(items);
        }
        DefaultsValue::DateNow => {
            let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z").to_string();
            cmd.arg("-date").arg(now);
        }
    }
    debug!(key, "writing SelfControl preference");
    run_checked(cmd)
}

/// Whether SelfControl currently has a block running for the given user.
pub fn is_running(username: &str) -> Result<bool, SelfControlError> {
    let output = Command::new("sudo")
        .args(["-u", username, "defaults", "read", DEFAULTS_DOMAIN, "BlockStartedDate"])
        .output()?;
    if !output.status.success() {
        // Key absent: SelfControl has never run for this user.
        return Ok(false);
    }
    Ok(block_started(&String::from_utf8_lossy(&output.stdout)))
}

/// A stored BlockStartedDate counts as running unless it is the
/// distant-future sentinel.
fn block_started(raw: &str) -> bool {
    let raw = raw.trim();
    !raw.is_empty() && !raw.starts_with(DISTANT_FUTURE_YEAR)
}

/// Launch the SelfControl helper binary inside the app bundle, which reads
/// the preferences written beforehand and installs the block.
pub fn start(app_path: &Path, username: &str) -> Result<(), SelfControlError> {
    let uid = uid_of(username)?;
    let binary = app_path.join("Contents/MacOS/org.eyebeam.SelfControl");
    info!(binary = %binary.display(), uid, "starting SelfControl");
    let mut cmd = Command::new(&binary);
    cmd.arg(uid.to_string()).arg("--install");
    run_checked(cmd)
}

/// Numeric uid of a local account.
pub fn uid_of(username: &str) -> Result<u32, SelfControlError> {
    let output = Command::new("id").args(["-u", username]).output()?;
    if !output.status.success() {
        return Err(SelfControlError::UnknownUser(username.to_string()));
    }
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .map_err(|_| SelfControlError::UnknownUser(username.to_string()))
}

/// Effective uid of this process; 0 means root.
pub fn effective_uid() -> Result<u32, SelfControlError> {
    let output = Command::new("id").arg("-u").output()?;
    if !output.status.success() {
        return Err(SelfControlError::CommandFailed {
            command: "id -u".to_string(),
            status: output.status,
        });
    }
    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .map_err(|_| SelfControlError::CommandFailed {
            command: "id -u".to_string(),
            status: output.status,
        })
}

/// All local account names, for validating the configured username.
pub fn os_usernames() -> Result<Vec<String>, SelfControlError> {
    let output = Command::new("dscl").args([".", "list", "/users"]).output()?;
    if !output.status.success() {
        return Err(SelfControlError::CommandFailed {
            command: "dscl . list /users".to_string(),
            status: output.status,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

fn run_checked(mut cmd: Command) -> Result<(), SelfControlError> {
    let status = cmd.status()?;
    if !status.success() {
        return Err(SelfControlError::CommandFailed {
            command: format!("{cmd:?}"),
            status,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_started_detection() {
        assert!(block_started("2026-03-02 09:00:00 +0000"));
        assert!(!block_started("4001-01-01 00:00:00 +0000"));
        assert!(!block_started(""));
        assert!(!block_started("   \n"));
    }
}
