//! `config`: create the schedule configuration if needed and open it for
//! editing.

use std::process::Command;

use anyhow::{Context, bail};
use tracing::info;

pub fn run_config() -> anyhow::Result<()> {
    let path = autoblock_config::config_file_path()?;
    if !path.exists() {
        autoblock_config::ensure_config_dir()?;
        std::fs::write(&path, autoblock_config::SAMPLE_CONFIG)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!(path = %path.display(), "wrote starter configuration");
    }

    let status = match std::env::var("EDITOR") {
        Ok(editor) if !editor.is_empty() => Command::new(editor).arg(&path).status(),
        // Fall back to the default GUI text editor.
        _ => Command::new("open").arg("-t").arg(&path).status(),
    }
    .context("failed to launch an editor")?;

    if !status.success() {
        bail!("editor exited with {status}");
    }
    Ok(())
}
