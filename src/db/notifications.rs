//! The pending-notification queue. The CLI enqueues rows when reminders
//! are created and the daemon polls for due ones and delivers them.

use super::{Database, StoreError};

/// Timestamps are stored as local wall-clock text in this format, which
/// sorts and compares lexicographically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One queued desktop notification. The id is the reminder's id, so
/// re-scheduling a reminder replaces its queue entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub fire_at: String,
}

impl Database {
    pub fn enqueue_notification(&self, n: &PendingNotification) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT OR REPLACE INTO pending_notifications (id, title, body, fire_at)
            VALUES (?, ?, ?, ?)
            "#,
            rusqlite::params![n.id, n.title, n.body, n.fire_at],
        )?;
        Ok(())
    }

    /// Best effort: removing an id that was never queued is not an error.
    pub fn remove_notification(&self, id: &str) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM pending_notifications WHERE id = ?", [id])?;
        Ok(())
    }

    pub fn remove_all_notifications(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM pending_notifications", [])?;
        Ok(())
    }

    pub fn pending_notifications(&self) -> Result<Vec<PendingNotification>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, body, fire_at FROM pending_notifications ORDER BY fire_at",
        )?;
        let rows = stmt
            .query_map([], row_to_pending)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Everything whose fire time is at or before `now` (formatted with
    /// [`TIMESTAMP_FORMAT`]).
    pub fn due_notifications(&self, now: &str) -> Result<Vec<PendingNotification>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, title, body, fire_at FROM pending_notifications
            WHERE fire_at <= ?
            ORDER BY fire_at
            "#,
        )?;
        let rows = stmt
            .query_map([now], row_to_pending)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }
}

fn row_to_pending(row: &rusqlite::Row) -> rusqlite::Result<PendingNotification> {
    Ok(PendingNotification {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        fire_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("meeplebox.db")).unwrap();
        db.initialize().unwrap();
        (dir, db)
    }

    fn pending(id: &str, fire_at: &str) -> PendingNotification {
        PendingNotification {
            id: id.to_string(),
            title: format!("Game Reminder: {}", id),
            body: "Your game starts at 18:00 - 20:00 with 4 players".to_string(),
            fire_at: fire_at.to_string(),
        }
    }

    #[test]
    fn test_enqueue_orders_by_fire_time() {
        let (_dir, db) = open_temp_db();
        db.enqueue_notification(&pending("b", "2026-09-02T18:00:00"))
            .unwrap();
        db.enqueue_notification(&pending("a", "2026-09-01T15:00:00"))
            .unwrap();

        let all = db.pending_notifications().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "a");
        assert_eq!(all[1].id, "b");
    }

    #[test]
    fn test_enqueue_same_id_replaces() {
        let (_dir, db) = open_temp_db();
        db.enqueue_notification(&pending("r1", "2026-09-01T15:00:00"))
            .unwrap();
        db.enqueue_notification(&pending("r1", "2026-09-03T09:00:00"))
            .unwrap();

        let all = db.pending_notifications().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].fire_at, "2026-09-03T09:00:00");
    }

    #[test]
    fn test_due_includes_boundary_and_past() {
        let (_dir, db) = open_temp_db();
        db.enqueue_notification(&pending("past", "2026-08-20T10:00:00"))
            .unwrap();
        db.enqueue_notification(&pending("exact", "2026-08-25T12:00:00"))
            .unwrap();
        db.enqueue_notification(&pending("future", "2026-08-30T12:00:00"))
            .unwrap();

        let due = db.due_notifications("2026-08-25T12:00:00").unwrap();
        let ids: Vec<&str> = due.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["past", "exact"]);
    }

    #[test]
    fn test_remove_is_best_effort() {
        let (_dir, db) = open_temp_db();
        db.enqueue_notification(&pending("r1", "2026-09-01T15:00:00"))
            .unwrap();

        db.remove_notification("missing").unwrap();
        assert_eq!(db.pending_notifications().unwrap().len(), 1);

        db.remove_notification("r1").unwrap();
        assert!(db.pending_notifications().unwrap().is_empty());
    }

    #[test]
    fn test_remove_all() {
        let (_dir, db) = open_temp_db();
        db.enqueue_notification(&pending("r1", "2026-09-01T15:00:00"))
            .unwrap();
        db.enqueue_notification(&pending("r2", "2026-09-02T15:00:00"))
            .unwrap();

        db.remove_all_notifications().unwrap();
        assert!(db.pending_notifications().unwrap().is_empty());
    }
}
