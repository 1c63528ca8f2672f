use anyhow::Result;
use serde_json::json;

use pillroutine::core::clock::Clock;
use pillroutine::core::firing;
use pillroutine::db::Database;
use pillroutine::models::config::Config;
use pillroutine::output::{self, human};

pub fn run_list(human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let scheduler = super::scheduler(&db, &config);

    let triggers = scheduler.list_scheduled()?;

    if human_flag {
        println!("{}", human::format_scheduled(&triggers, scheduler.clock()));
    } else {
        let count = triggers.len();
        let out = output::success(
            "notify_list",
            json!({
                "notifications": triggers,
                "count": count,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_upcoming(hours: u32, human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let scheduler = super::scheduler(&db, &config);

    let clock = scheduler.clock();
    let from_ms = clock.to_epoch_millis(clock.now());
    let to_ms = from_ms + i64::from(hours) * 3_600_000;
    let firings = firing::upcoming(&scheduler.list_scheduled()?, from_ms, to_ms);

    if human_flag {
        println!("{}", human::format_upcoming(&firings, clock));
    } else {
        let items: Vec<_> = firings
            .iter()
            .map(|f| {
                json!({
                    "trigger_id": f.trigger_id,
                    "at_ms": f.at_ms,
                    "at": clock.from_epoch_millis(f.at_ms),
                    "body": f.body,
                })
            })
            .collect();
        let out = output::success(
            "notify_upcoming",
            json!({
                "hours": hours,
                "firings": items,
                "count": firings.len(),
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_cancel_all(yes: bool, human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;

    if !yes {
        eprint!("Cancel every scheduled notification? [y/N] ");
        use std::io::{self, BufRead, Write};
        io::stderr().flush().ok();
        let mut buf = String::new();
        let bytes = io::stdin().lock().read_line(&mut buf)?;
        if bytes == 0 || !buf.trim().eq_ignore_ascii_case("y") {
            anyhow::bail!("Aborted.");
        }
    }

    let scheduler = super::scheduler(&db, &config);
    let cleared = scheduler.cancel_all()?;

    if human_flag {
        println!("All notifications cancelled ({} routine trigger(s) released).", cleared);
    } else {
        let out = output::success("notify_cancel_all", json!({ "released_handles": cleared }));
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_test(name: &str, human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let mut scheduler = super::scheduler(&db, &config);

    let displayed = scheduler.display_test(name)?;

    if human_flag {
        if displayed {
            println!("Displayed: {}", scheduler.settings().body_for(name));
        } else {
            println!("Not displayed: notification permission denied.");
        }
    } else {
        let out = output::success(
            "notify_test",
            json!({
                "displayed": displayed,
                "title": scheduler.settings().title,
                "body": scheduler.settings().body_for(name),
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_sweep(human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let scheduler = super::scheduler(&db, &config);

    let today = scheduler.clock().now().date();
    let reports = scheduler.sweep_expired(today)?;

    if human_flag {
        if !config.scheduling.enforce_end_date {
            println!("End dates are not enforced (scheduling.enforce_end_date = false).");
        } else if reports.is_empty() {
            println!("No expired routines.");
        } else {
            for r in &reports {
                println!("{}", human::format_cancel(r));
            }
        }
    } else {
        let out = output::success(
            "notify_sweep",
            json!({
                "enforced": config.scheduling.enforce_end_date,
                "routines": reports,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
