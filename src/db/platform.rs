use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::models::trigger::{Channel, Notification, TriggerNotification};

use super::Database;

/// A notification the local host displayed immediately.
#[derive(Debug, Clone)]
pub struct DisplayedNotification {
    pub notification: Notification,
    pub displayed_at: DateTime<Utc>,
}

impl Database {
    pub fn upsert_channel(&self, channel: &Channel) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO platform_channels (id, name, importance, sound, vibration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                channel.id,
                channel.name,
                channel.importance.to_string(),
                channel.sound,
                channel.vibration,
            ],
        )?;
        Ok(())
    }

    pub fn get_channel(&self, id: &str) -> Result<Option<Channel>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, importance, sound, vibration FROM platform_channels WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, bool>(4)?,
            ))
        })?;
        match rows.next() {
            Some(row) => {
                let (id, name, importance, sound, vibration) = row?;
                Ok(Some(Channel {
                    id,
                    name,
                    importance: importance.parse()?,
                    sound,
                    vibration,
                }))
            }
            None => Ok(None),
        }
    }

    /// Store a trigger. An existing trigger with the same id is overwritten.
    pub fn upsert_platform_trigger(&self, n: &TriggerNotification) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO platform_triggers (id, title, body, channel_id, timestamp_ms, repeat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                n.id,
                n.title,
                n.body,
                n.channel_id,
                n.timestamp_ms,
                n.repeat.to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn list_platform_triggers(&self) -> Result<Vec<TriggerNotification>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, body, channel_id, timestamp_ms, repeat
             FROM platform_triggers ORDER BY timestamp_ms ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut triggers = Vec::new();
        for row in rows {
            let (id, title, body, channel_id, timestamp_ms, repeat) = row?;
            triggers.push(TriggerNotification {
                id,
                title,
                body,
                channel_id,
                timestamp_ms,
                repeat: repeat.parse()?,
            });
        }
        Ok(triggers)
    }

    pub fn delete_platform_trigger(&self, id: &str) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM platform_triggers WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }

    pub fn clear_platform_triggers(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM platform_triggers", [])?)
    }

    pub fn insert_displayed(&self, n: &Notification, at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT INTO platform_displayed (title, body, channel_id, displayed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![n.title, n.body, n.channel_id, at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn list_displayed(&self) -> Result<Vec<DisplayedNotification>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, body, channel_id, displayed_at FROM platform_displayed ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut shown = Vec::new();
        for row in rows {
            let (title, body, channel_id, at) = row?;
            shown.push(DisplayedNotification {
                notification: Notification {
                    title,
                    body,
                    channel_id,
                },
                displayed_at: DateTime::parse_from_rfc3339(&at)?.with_timezone(&Utc),
            });
        }
        Ok(shown)
    }
}
