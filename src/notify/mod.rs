//! Notification permission state and the reminder scheduling front end.

use chrono::{Duration, Local, NaiveDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::NotificationsConfig;
use crate::db::{Database, PendingNotification, StoreError, TIMESTAMP_FORMAT};
use crate::models::Reminder;

const PERMISSION_KEY: &str = "notificationPermission";

/// Whether the user has allowed desktop notifications. Stored in the
/// database so the answer survives restarts and is shared with the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Undetermined,
    Granted,
    Denied,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Undetermined => "undetermined",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        }
    }

    fn from_str(s: &str) -> Self {
        match s {
            "granted" => Permission::Granted,
            "denied" => Permission::Denied,
            _ => Permission::Undetermined,
        }
    }
}

/// Schedules reminder notifications into the pending queue and answers
/// permission queries. Delivery happens in the daemon.
pub struct NotificationCenter {
    enabled: bool,
}

impl NotificationCenter {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            enabled: config.enabled,
        }
    }

    pub fn permission(&self, db: &Database) -> Result<Permission, StoreError> {
        Ok(db
            .get_string(PERMISSION_KEY)?
            .map(|s| Permission::from_str(&s))
            .unwrap_or(Permission::Undetermined))
    }

    /// Resolve an undetermined permission from configuration. Once the
    /// answer is recorded it sticks; use [`set_permission`] to change it.
    ///
    /// [`set_permission`]: NotificationCenter::set_permission
    pub fn request_permission(&self, db: &Database) -> Result<Permission, StoreError> {
        let current = self.permission(db)?;
        if current != Permission::Undetermined {
            return Ok(current);
        }
        let resolved = if self.enabled {
            Permission::Granted
        } else {
            Permission::Denied
        };
        db.set_string(PERMISSION_KEY, resolved.as_str())?;
        info!("Notification permission resolved to {}", resolved.as_str());
        Ok(resolved)
    }

    /// Record an explicit decision. Disabling also drains the queue, so
    /// nothing already scheduled fires afterwards.
    pub fn set_permission(&self, db: &Database, granted: bool) -> Result<Permission, StoreError> {
        let permission = if granted {
            Permission::Granted
        } else {
            Permission::Denied
        };
        db.set_string(PERMISSION_KEY, permission.as_str())?;
        if permission == Permission::Denied {
            db.remove_all_notifications()?;
        }
        info!("Notification permission set to {}", permission.as_str());
        Ok(permission)
    }

    /// Queue the notification for a reminder. Resolves an undetermined
    /// permission first; when denied this is a silent no-op and the
    /// reminder itself stays persisted. A fire time already in the past
    /// is delivered on the next poll.
    pub fn schedule(&self, db: &Database, reminder: &Reminder) -> Result<(), StoreError> {
        if self.request_permission(db)? != Permission::Granted {
            debug!(
                "Notifications denied, not queueing reminder {}",
                reminder.id
            );
            return Ok(());
        }
        let fire_at = fire_time(reminder).format(TIMESTAMP_FORMAT).to_string();
        let pending = PendingNotification {
            id: reminder.id.to_string(),
            title: notification_title(reminder),
            body: notification_body(reminder),
            fire_at,
        };
        debug!(
            "Queued notification for reminder {} at {}",
            pending.id, pending.fire_at
        );
        db.enqueue_notification(&pending)
    }

    pub fn cancel(&self, db: &Database, reminder_id: Uuid) -> Result<(), StoreError> {
        db.remove_notification(&reminder_id.to_string())
    }

    pub fn cancel_all(&self, db: &Database) -> Result<(), StoreError> {
        db.remove_all_notifications()
    }

    pub fn pending(&self, db: &Database) -> Result<Vec<PendingNotification>, StoreError> {
        db.pending_notifications()
    }

    /// Queue entries whose fire time has arrived, by local wall clock.
    pub fn due(&self, db: &Database) -> Result<Vec<PendingNotification>, StoreError> {
        let now = Local::now()
            .naive_local()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        db.due_notifications(&now)
    }
}

/// Session start minus the reminder's lead time.
pub fn fire_time(reminder: &Reminder) -> NaiveDateTime {
    reminder.starts_at() - Duration::seconds(reminder.notify_before.offset_secs())
}

fn notification_title(reminder: &Reminder) -> String {
    format!("Game Reminder: {}", reminder.game_title)
}

fn notification_body(reminder: &Reminder) -> String {
    format!(
        "Your game starts at {} - {} with {} players",
        reminder.start_time.format("%H:%M"),
        reminder.end_time.format("%H:%M"),
        reminder.players_count
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadTime;
    use chrono::{NaiveDate, NaiveTime};

    fn open_temp_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("meeplebox.db")).unwrap();
        db.initialize().unwrap();
        (dir, db)
    }

    fn center(enabled: bool) -> NotificationCenter {
        NotificationCenter::new(&NotificationsConfig {
            enabled,
            poll_interval_secs: 60,
        })
    }

    fn reminder(notify_before: LeadTime) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            game_title: "Catan".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
            players_count: 4,
            notify_before,
        }
    }

    #[test]
    fn test_fire_time_one_day_before() {
        let r = reminder(LeadTime::OneDay);
        assert_eq!(
            fire_time(&r),
            NaiveDate::from_ymd_opt(2026, 9, 9)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_fire_time_three_hours_before() {
        let r = reminder(LeadTime::ThreeHours);
        assert_eq!(
            fire_time(&r),
            NaiveDate::from_ymd_opt(2026, 9, 10)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_notification_content() {
        let r = reminder(LeadTime::OneDay);
        assert_eq!(notification_title(&r), "Game Reminder: Catan");
        assert_eq!(
            notification_body(&r),
            "Your game starts at 18:00 - 20:30 with 4 players"
        );
    }

    #[test]
    fn test_schedule_and_cancel() {
        let (_dir, db) = open_temp_db();
        let nc = center(true);
        let r = reminder(LeadTime::ThreeHours);

        nc.schedule(&db, &r).unwrap();
        let pending = nc.pending(&db).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, r.id.to_string());
        assert_eq!(pending[0].fire_at, "2026-09-10T15:00:00");

        nc.cancel(&db, r.id).unwrap();
        assert!(nc.pending(&db).unwrap().is_empty());
    }

    #[test]
    fn test_reschedule_replaces_queue_entry() {
        let (_dir, db) = open_temp_db();
        let nc = center(true);
        let mut r = reminder(LeadTime::OneDay);

        nc.schedule(&db, &r).unwrap();
        r.notify_before = LeadTime::ThreeHours;
        nc.schedule(&db, &r).unwrap();

        let pending = nc.pending(&db).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].fire_at, "2026-09-10T15:00:00");
    }

    #[test]
    fn test_permission_starts_undetermined() {
        let (_dir, db) = open_temp_db();
        let nc = center(true);
        assert_eq!(nc.permission(&db).unwrap(), Permission::Undetermined);
    }

    #[test]
    fn test_request_resolves_from_config_and_sticks() {
        let (_dir, db) = open_temp_db();

        let granted = center(true).request_permission(&db).unwrap();
        assert_eq!(granted, Permission::Granted);

        // Already answered; a differently configured center does not flip it.
        let still = center(false).request_permission(&db).unwrap();
        assert_eq!(still, Permission::Granted);
    }

    #[test]
    fn test_set_permission_overrides() {
        let (_dir, db) = open_temp_db();
        let nc = center(true);

        nc.request_permission(&db).unwrap();
        nc.set_permission(&db, false).unwrap();
        assert_eq!(nc.permission(&db).unwrap(), Permission::Denied);

        nc.set_permission(&db, true).unwrap();
        assert_eq!(nc.permission(&db).unwrap(), Permission::Granted);
    }

    #[test]
    fn test_schedule_denied_is_silent_noop() {
        let (_dir, db) = open_temp_db();
        let nc = center(false);

        nc.schedule(&db, &reminder(LeadTime::OneDay)).unwrap();
        assert!(nc.pending(&db).unwrap().is_empty());
        assert_eq!(nc.permission(&db).unwrap(), Permission::Denied);
    }

    #[test]
    fn test_disabling_drains_the_queue() {
        let (_dir, db) = open_temp_db();
        let nc = center(true);

        nc.schedule(&db, &reminder(LeadTime::OneDay)).unwrap();
        nc.schedule(&db, &reminder(LeadTime::ThreeHours)).unwrap();
        assert_eq!(nc.pending(&db).unwrap().len(), 2);

        nc.set_permission(&db, false).unwrap();
        assert!(nc.pending(&db).unwrap().is_empty());
    }

    #[test]
    fn test_past_fire_times_are_due() {
        let (_dir, db) = open_temp_db();
        let nc = center(true);
        let mut r = reminder(LeadTime::OneDay);
        r.date = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();

        nc.schedule(&db, &r).unwrap();
        let due = nc.due(&db).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, r.id.to_string());
    }
}
