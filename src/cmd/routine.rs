use anyhow::Result;
use chrono::TimeDelta;
use serde_json::json;

use pillroutine::core::clock::{Clock, SystemClock};
use pillroutine::core::recurrence::{self, EndDatePolicy};
use pillroutine::core::scheduler::BatchControl;
use pillroutine::db::Database;
use pillroutine::error::ScheduleError;
use pillroutine::models::config::Config;
use pillroutine::models::routine::{Routine, RoutineWindow, WeekdayMask, parse_times};
use pillroutine::output::{self, human};

use crate::cli::RoutineArgs;

/// Routines without an explicit end run for a year.
const DEFAULT_DURATION_DAYS: i64 = 365;

fn build_routine(args: &RoutineArgs, id: Option<&str>) -> Result<Routine> {
    let times = parse_times(&args.times)?;
    let days: WeekdayMask = args.days.parse()?;
    let start = args.start.unwrap_or_else(|| SystemClock.now().date());
    let end = match args.end {
        Some(end) => end,
        None => start
            .checked_add_signed(TimeDelta::days(DEFAULT_DURATION_DAYS))
            .ok_or(ScheduleError::DateOutOfRange(start))?,
    };
    let window = RoutineWindow::new(start, end)?;

    let routine = Routine::new(args.name.trim(), times, days, window);
    let routine = match id {
        Some(id) => routine.with_id(id),
        None => routine,
    };
    routine.validate()?;
    Ok(routine)
}

pub fn run_add(args: &RoutineArgs, id: Option<&str>, human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let routine = build_routine(args, id)?;
    let db = Database::open(&Config::db_path())?;
    let mut scheduler = super::scheduler(&db, &config);

    let report = scheduler.schedule_routine(&routine, &BatchControl::default())?;
    db.upsert_routine(&routine)?;

    if human_flag {
        println!("{}", human::format_report(&routine, &report));
    } else {
        let out = output::success(
            "routine_add",
            json!({
                "routine": routine,
                "status": report.status(),
                "registered": report.registered(),
                "report": report,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_preview(args: &RoutineArgs, human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let routine = build_routine(args, Some("preview"))?;
    let policy = EndDatePolicy::from_flag(config.scheduling.enforce_end_date);
    let triggers = recurrence::expand_routine(&routine, SystemClock.now(), policy)?;

    if human_flag {
        println!("{}", human::format_routine_line(&routine));
        println!("{}", human::format_triggers(&triggers));
    } else {
        let count = triggers.len();
        let out = output::success(
            "routine_preview",
            json!({
                "routine": routine,
                "triggers": triggers,
                "count": count,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_list(human_flag: bool) -> Result<()> {
    let db = Database::open(&Config::db_path())?;

    let mut rows = Vec::new();
    for routine in db.list_routines()? {
        let handles = db.count_handles(&routine.id)?;
        rows.push((routine, handles));
    }

    if human_flag {
        println!("{}", human::format_routine_list(&rows));
    } else {
        let routines: Vec<_> = rows
            .iter()
            .map(|(r, handles)| json!({ "routine": r, "triggers": handles }))
            .collect();
        let count = routines.len();
        let out = output::success(
            "routine_list",
            json!({
                "routines": routines,
                "count": count,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_show(id: &str, human_flag: bool) -> Result<()> {
    let db = Database::open(&Config::db_path())?;
    let Some(routine) = db.get_routine(id)? else {
        return Err(ScheduleError::UnknownRoutine(id.to_string()).into());
    };
    let handles = db.handles_for(id)?;

    if human_flag {
        println!("{}", human::format_routine_line(&routine));
        println!("{}", human::format_triggers(&handles));
    } else {
        let out = output::success(
            "routine_show",
            json!({
                "routine": routine,
                "triggers": handles,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

pub fn run_cancel(id: &str, human_flag: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&Config::db_path())?;
    let scheduler = super::scheduler(&db, &config);

    let known = db.get_routine(id)?.is_some() || db.count_handles(id)? > 0;
    if !known {
        return Err(ScheduleError::UnknownRoutine(id.to_string()).into());
    }

    let report = scheduler.cancel_routine(id)?;
    // Keep the definition while some triggers are still registered.
    let removed = report.failed.is_empty() && db.remove_routine(id)?;

    if human_flag {
        println!("{}", human::format_cancel(&report));
    } else {
        let out = output::success(
            "routine_cancel",
            json!({
                "routine_id": id,
                "cancelled": report.cancelled,
                "failed": report.failed,
                "removed": removed,
            }),
        );
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}
