//! autoblock-launchd: Rendering and registering the launchd job that fires
//! at every compiled trigger instant.
//!
//! Each [`TriggerInstant`] maps 1:1 to a `StartCalendarInterval` entry. Stop
//! instants are registered like Start instants: the fired command
//! re-evaluates the schedule, finds no active window, and exits. That is
//! exactly the informational no-op the trigger stands for.

use std::fmt::Write as _;
use std::path::Path;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::{info, warn};

use autoblock_types::TriggerInstant;

/// launchd job label.
pub const JOB_LABEL: &str = "com.autoblock.schedule";
/// Where the job definition lives. A LaunchDaemon rather than a LaunchAgent:
/// the job must fire no matter who is logged in.
pub const PLIST_PATH: &str = "/Library/LaunchDaemons/com.autoblock.schedule.plist";

#[derive(Debug, Error)]
pub enum LaunchdError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("launchctl {verb} exited with {status}")]
    Launchctl { verb: &'static str, status: ExitStatus },
}

/// Render the job plist with one calendar entry per trigger instant.
///
/// `program_args` is the full argv launchd should run at each instant,
/// typically `[<autoblock binary>, "run"]`. `RunAtLoad` is set so a reboot
/// in the middle of a block window re-blocks immediately.
pub fn render_plist(program_args: &[String], triggers: &[TriggerInstant]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \
         \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
    );
    out.push_str("<plist version=\"1.0\">\n");
    out.push_str("<dict>\n");
    out.push_str("    <key>Label</key>\n");
    let _ = writeln!(out, "    <string>{JOB_LABEL}</string>");

    out.push_str("    <key>ProgramArguments</key>\n");
    out.push_str("    <array>\n");
    for arg in program_args {
        let _ = writeln!(out, "        <string>{}</string>", xml_escape(arg));
    }
    out.push_str("    </array>\n");

    out.push_str("    <key>StartCalendarInterval</key>\n");
    out.push_str("    <array>\n");
    for trigger in triggers {
        out.push_str("        <dict>\n");
        out.push_str("            <key>Weekday</key>\n");
        let _ = writeln!(out, "            <integer>{}</integer>", u8::from(trigger.weekday));
        out.push_str("            <key>Hour</key>\n");
        let _ = writeln!(out, "            <integer>{}</integer>", trigger.hour);
        out.push_str("            <key>Minute</key>\n");
        let _ = writeln!(out, "            <integer>{}</integer>", trigger.minute);
        out.push_str("        </dict>\n");
    }
    out.push_str("    </array>\n");

    out.push_str("    <key>RunAtLoad</key>\n");
    out.push_str("    <true/>\n");
    out.push_str("</dict>\n");
    out.push_str("</plist>\n");
    out
}

/// Replace any previously installed job with the given plist and load it.
pub fn install(plist: &str) -> Result<(), LaunchdError> {
    install_at(plist, Path::new(PLIST_PATH))
}

/// Unload and delete the installed job, if any.
pub fn uninstall() -> Result<(), LaunchdError> {
    uninstall_at(Path::new(PLIST_PATH))
}

fn install_at(plist: &str, path: &Path) -> Result<(), LaunchdError> {
    if path.exists() {
        // The old job may already be unloaded; only the removal must succeed.
        if let Err(e) = launchctl("unload", path) {
            warn!("unloading previous job failed: {e}");
        }
        std::fs::remove_file(path)?;
        info!("removed previous launchd job");
    }

    std::fs::write(path, plist)?;
    launchctl("load", path)?;
    info!(path = %path.display(), "launchd job installed");
    Ok(())
}

fn uninstall_at(path: &Path) -> Result<(), LaunchdError> {
    if !path.exists() {
        return Ok(());
    }
    if let Err(e) = launchctl("unload", path) {
        warn!("unloading job failed: {e}");
    }
    std::fs::remove_file(path)?;
    info!(path = %path.display(), "launchd job removed");
    Ok(())
}

fn launchctl(verb: &'static str, path: &Path) -> Result<(), LaunchdError> {
    let status = Command::new("launchctl")
        .arg(verb)
        .arg("-w")
        .arg(path)
        .status()?;
    if !status.success() {
        return Err(LaunchdError::Launchctl { verb, status });
    }
    Ok(())
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoblock_types::{TriggerAction, Weekday};

    fn args() -> Vec<String> {
        vec!["/usr/local/bin/autoblock".into(), "run".into()]
    }

    #[test]
    fn test_render_one_entry_per_trigger() {
        let triggers = [
            TriggerInstant {
                weekday: Weekday::Monday,
                hour: 9,
                minute: 0,
                action: TriggerAction::Start { duration_minutes: 480 },
            },
            TriggerInstant {
                weekday: Weekday::Monday,
                hour: 17,
                minute: 0,
                action: TriggerAction::Stop,
            },
        ];
        let plist = render_plist(&args(), &triggers);

        assert_eq!(plist.matches("<key>Weekday</key>").count(), 2);
        assert!(plist.contains(&format!("<string>{JOB_LABEL}</string>")));
        assert!(plist.contains("<string>/usr/local/bin/autoblock</string>"));
        assert!(plist.contains("<string>run</string>"));
        assert!(plist.contains("<key>RunAtLoad</key>"));
        // Stop instants become plain calendar entries too.
        assert!(plist.contains("<integer>17</integer>"));
    }

    #[test]
    fn test_render_weekday_numbers() {
        let triggers = [TriggerInstant {
            weekday: Weekday::Sunday,
            hour: 23,
            minute: 5,
            action: TriggerAction::Stop,
        }];
        let plist = render_plist(&args(), &triggers);
        assert!(plist.contains("<integer>7</integer>"));
        assert!(plist.contains("<integer>23</integer>"));
        assert!(plist.contains("<integer>5</integer>"));
    }

    #[test]
    fn test_render_escapes_program_args() {
        let args = vec!["/tmp/a&b <dir>/autoblock".to_string(), "run".to_string()];
        let plist = render_plist(&args, &[]);
        assert!(plist.contains("<string>/tmp/a&amp;b &lt;dir&gt;/autoblock</string>"));
        assert!(!plist.contains("a&b"));
    }
}
