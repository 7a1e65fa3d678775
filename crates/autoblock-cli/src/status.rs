//! `status`: inspect the compiled schedule without touching anything.

use autoblock_types::TriggerAction;

use crate::run;

pub fn run_status() -> anyhow::Result<()> {
    let config = autoblock_config::load_config()?;
    let compiled = autoblock_schedule::compile(&config.block_schedules)?;

    println!(
        "{} block window(s) compiling to {} trigger(s):",
        compiled.intervals().len(),
        compiled.triggers().len()
    );
    for trigger in compiled.triggers() {
        match trigger.action {
            TriggerAction::Start { duration_minutes } => {
                println!("  {trigger}  start  ({duration_minutes} min)");
            }
            TriggerAction::Stop => {
                println!("  {trigger}  stop");
            }
        }
    }

    let now = run::minute_of_week_now();
    match compiled.active_at(now) {
        Some(window) => println!(
            "block active now ({}); {} minute(s) remaining",
            window.describe(),
            window.minutes_until_end(now)
        ),
        None => println!("no block active now"),
    }
    Ok(())
}
