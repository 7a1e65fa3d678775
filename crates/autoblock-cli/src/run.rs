//! `run`: the command launchd fires at every trigger instant.
//!
//! Start instants find their window active and launch SelfControl with the
//! minutes remaining; Stop instants (and spurious fires) find nothing
//! active and exit quietly.

use chrono::{Datelike, Local, Timelike};
use tracing::info;

use autoblock_config::Config;
use autoblock_schedule::CompiledSchedule;
use autoblock_selfcontrol::DefaultsValue;
use autoblock_types::MINUTES_PER_DAY;

pub fn run_now() -> anyhow::Result<()> {
    let config = autoblock_config::load_config()?;
    let compiled = autoblock_schedule::compile(&config.block_schedules)?;
    evaluate(&config, &compiled)
}

/// Evaluate the schedule at the current instant and start SelfControl if a
/// window is active.
pub fn evaluate(config: &Config, compiled: &CompiledSchedule) -> anyhow::Result<()> {
    if autoblock_selfcontrol::is_running(&config.username)? {
        info!("SelfControl is already running; nothing to do");
        return Ok(());
    }

    let now = minute_of_week_now();
    let Some(window) = compiled.active_at(now) else {
        info!("no block window active right now");
        return Ok(());
    };

    let entry = &config.block_schedules[window.source()];
    let duration = window.minutes_until_end(now);
    info!(window = %window.describe(), duration, "block window active");

    autoblock_selfcontrol::write_default(
        &config.username,
        "BlockDuration",
        DefaultsValue::Int(i64::from(duration)),
    )?;
    autoblock_selfcontrol::write_default(
        &config.username,
        "BlockAsWhitelist",
        DefaultsValue::Int(if entry.block_as_whitelist == Some(true) { 1 } else { 0 }),
    )?;

    // Per-window list wins over the global one.
    if let Some(hosts) = entry.host_blacklist.as_ref().or(config.host_blacklist.as_ref()) {
        autoblock_selfcontrol::write_default(
            &config.username,
            "HostBlacklist",
            DefaultsValue::Array(hosts),
        )?;
    }

    // Old SelfControl releases never set the start date themselves.
    if config.legacy_mode == Some(true) {
        autoblock_selfcontrol::write_default(
            &config.username,
            "BlockStartedDate",
            DefaultsValue::DateNow,
        )?;
    }

    autoblock_selfcontrol::start(&config.selfcontrol_path, &config.username)?;
    info!(minutes = duration, "SelfControl started");
    Ok(())
}

/// Current local time as minutes since Monday 00:00.
pub fn minute_of_week_now() -> u32 {
    let now = Local::now();
    (now.weekday().number_from_monday() - 1) * MINUTES_PER_DAY + now.hour() * 60 + now.minute()
}
