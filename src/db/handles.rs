use anyhow::{Result, anyhow};
use chrono::{NaiveDateTime, Weekday};
use rusqlite::params;

use crate::models::trigger::{RepeatFrequency, TriggerHandle, TriggerSpec};

use super::Database;

const FIRE_AT_FMT: &str = "%Y-%m-%dT%H:%M:%S";

struct HandleRow {
    routine_id: String,
    reminder_index: i64,
    weekday: Option<u32>,
    fire_at: String,
    repeat: String,
}

fn weekday_from_sunday(n: u32) -> Result<Weekday> {
    if n > 6 {
        return Err(anyhow!("invalid stored weekday: {n}"));
    }
    // chrono counts from Monday = 0
    Weekday::try_from(((n + 6) % 7) as u8).map_err(|_| anyhow!("invalid stored weekday: {n}"))
}

fn row_to_spec(r: HandleRow) -> Result<TriggerSpec> {
    let weekday = r.weekday.map(weekday_from_sunday).transpose()?;
    Ok(TriggerSpec {
        handle: TriggerHandle {
            routine_id: r.routine_id,
            reminder_index: usize::try_from(r.reminder_index)?,
            weekday,
        },
        fire_at: NaiveDateTime::parse_from_str(&r.fire_at, FIRE_AT_FMT)?,
        repeat: r.repeat.parse()?,
    })
}

impl Database {
    /// Record a trigger the scheduler registered with the platform.
    pub fn insert_handle(&self, spec: &TriggerSpec) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO routine_handles (trigger_id, routine_id, reminder_index, weekday, fire_at, repeat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                spec.id(),
                spec.handle.routine_id,
                spec.handle.reminder_index as i64,
                spec.handle.weekday.map(|d| d.num_days_from_sunday()),
                spec.fire_at.format(FIRE_AT_FMT).to_string(),
                spec.repeat.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Handles recorded for a routine, in registration order.
    pub fn handles_for(&self, routine_id: &str) -> Result<Vec<TriggerSpec>> {
        let mut stmt = self.conn.prepare(
            "SELECT routine_id, reminder_index, weekday, fire_at, repeat
             FROM routine_handles WHERE routine_id = ?1 ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![routine_id], |row| {
            Ok(HandleRow {
                routine_id: row.get(0)?,
                reminder_index: row.get(1)?,
                weekday: row.get(2)?,
                fire_at: row.get(3)?,
                repeat: row.get(4)?,
            })
        })?;

        let mut specs = Vec::new();
        for row in rows {
            specs.push(row_to_spec(row?)?);
        }
        Ok(specs)
    }

    pub fn count_handles(&self, routine_id: &str) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM routine_handles WHERE routine_id = ?1",
            params![routine_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(n)?)
    }

    pub fn delete_handle(&self, trigger_id: &str) -> Result<bool> {
        let count = self.conn.execute(
            "DELETE FROM routine_handles WHERE trigger_id = ?1",
            params![trigger_id],
        )?;
        Ok(count > 0)
    }

    pub fn clear_handles(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM routine_handles", [])?)
    }
}
