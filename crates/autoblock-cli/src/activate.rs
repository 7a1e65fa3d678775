//! `activate` and `deactivate`: compile the schedule and manage the launchd
//! job built from it.

use anyhow::{Context, bail};
use tracing::info;

use crate::run;

pub fn run_activate() -> anyhow::Result<()> {
    ensure_root()?;

    let config = autoblock_config::load_config()?;

    // Environment checks the config loader deliberately leaves to us.
    let users = autoblock_selfcontrol::os_usernames()?;
    if !users.iter().any(|u| u == &config.username) {
        bail!(
            "username '{}' is not a macOS account on this machine; \
             run `whoami` to find yours",
            config.username
        );
    }
    if !config.selfcontrol_path.exists() {
        bail!(
            "selfcontrol-path {} does not exist; use an absolute path including \
             the .app extension, e.g. /Applications/SelfControl.app",
            config.selfcontrol_path.display()
        );
    }

    // All-or-nothing: a validation error aborts here, before the installed
    // job (if any) is touched.
    let compiled = autoblock_schedule::compile(&config.block_schedules)?;
    info!(
        windows = compiled.intervals().len(),
        triggers = compiled.triggers().len(),
        "schedule compiled"
    );

    let exe = std::env::current_exe().context("cannot resolve own executable path")?;
    let program_args = vec![exe.to_string_lossy().into_owned(), "run".to_string()];
    let plist = autoblock_launchd::render_plist(&program_args, compiled.triggers());
    autoblock_launchd::install(&plist)?;

    // If this instant is already inside a window, start blocking now rather
    // than waiting for the next trigger.
    run::evaluate(&config, &compiled)
}

pub fn run_deactivate() -> anyhow::Result<()> {
    ensure_root()?;
    autoblock_launchd::uninstall()?;
    info!("schedule deactivated; a block already in progress runs to its end");
    Ok(())
}

fn ensure_root() -> anyhow::Result<()> {
    if autoblock_selfcontrol::effective_uid()? != 0 {
        bail!("this command needs elevated rights: sudo autoblock ...");
    }
    Ok(())
}
