use anyhow::Result;
use rusqlite::Connection;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS routines (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            times       TEXT NOT NULL,
            days        TEXT NOT NULL,
            start_date  TEXT NOT NULL,
            end_date    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS routine_handles (
            trigger_id      TEXT PRIMARY KEY,
            routine_id      TEXT NOT NULL,
            reminder_index  INTEGER NOT NULL,
            weekday         INTEGER,
            fire_at         TEXT NOT NULL,
            repeat          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_handles_routine ON routine_handles(routine_id);

        CREATE TABLE IF NOT EXISTS platform_channels (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            importance  TEXT NOT NULL,
            sound       INTEGER NOT NULL,
            vibration   INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS platform_triggers (
            id            TEXT PRIMARY KEY,
            title         TEXT NOT NULL,
            body          TEXT NOT NULL,
            channel_id    TEXT NOT NULL,
            timestamp_ms  INTEGER NOT NULL,
            repeat        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS platform_displayed (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            title         TEXT NOT NULL,
            body          TEXT NOT NULL,
            channel_id    TEXT NOT NULL,
            displayed_at  TEXT NOT NULL
        );",
    )?;
    Ok(())
}
