use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;

use crate::models::routine::{ReminderTime, Routine, RoutineWindow, WeekdayMask};

use super::Database;

struct RoutineRow {
    id: String,
    name: String,
    times: String,
    days: String,
    start_date: String,
    end_date: String,
    created_at: String,
}

fn row_to_routine(r: RoutineRow) -> Result<Routine> {
    let times: Vec<ReminderTime> = serde_json::from_str(&r.times)?;
    let days: WeekdayMask = serde_json::from_str(&r.days)?;
    let start = NaiveDate::parse_from_str(&r.start_date, "%Y-%m-%d")?;
    let end = NaiveDate::parse_from_str(&r.end_date, "%Y-%m-%d")?;
    let created_at: DateTime<Utc> =
        DateTime::parse_from_rfc3339(&r.created_at)?.with_timezone(&Utc);

    Ok(Routine {
        id: r.id,
        name: r.name,
        times,
        days,
        // stored rows were validated on the way in
        window: RoutineWindow { start, end },
        created_at,
    })
}

const SELECT_COLS: &str = "id, name, times, days, start_date, end_date, created_at";

macro_rules! map_row {
    ($row:expr) => {
        Ok(RoutineRow {
            id: $row.get(0)?,
            name: $row.get(1)?,
            times: $row.get(2)?,
            days: $row.get(3)?,
            start_date: $row.get(4)?,
            end_date: $row.get(5)?,
            created_at: $row.get(6)?,
        })
    };
}

impl Database {
    /// Insert a routine, replacing any previous definition with the same id.
    pub fn upsert_routine(&self, routine: &Routine) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO routines (id, name, times, days, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                routine.id,
                routine.name,
                serde_json::to_string(&routine.times)?,
                serde_json::to_string(&routine.days)?,
                routine.window.start.format("%Y-%m-%d").to_string(),
                routine.window.end.format("%Y-%m-%d").to_string(),
                routine.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_routine(&self, id: &str) -> Result<Option<Routine>> {
        let sql = format!("SELECT {SELECT_COLS} FROM routines WHERE id = ?1");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params![id], |row| map_row!(row))?;
        match rows.next() {
            Some(row) => Ok(Some(row_to_routine(row?)?)),
            None => Ok(None),
        }
    }

    pub fn list_routines(&self) -> Result<Vec<Routine>> {
        let sql = format!("SELECT {SELECT_COLS} FROM routines ORDER BY created_at ASC, name ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| map_row!(row))?;

        let mut routines = Vec::new();
        for row in rows {
            routines.push(row_to_routine(row?)?);
        }
        Ok(routines)
    }

    pub fn remove_routine(&self, id: &str) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM routines WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }
}
