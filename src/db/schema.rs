pub const SCHEMA: &str = r#"
-- Defaults table: one serialized collection blob per namespaced key,
-- the local stand-in for a platform key-value store.
CREATE TABLE IF NOT EXISTS defaults (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Pending one-shot notifications, keyed by the owning reminder id.
-- Shared with the daemon, which delivers and deletes due rows.
CREATE TABLE IF NOT EXISTS pending_notifications (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    fire_at TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_pending_notifications_fire_at
    ON pending_notifications(fire_at);
"#;

/// Idempotent statements applied after the base schema. Empty for now;
/// additions go here so existing databases pick them up on open.
pub const MIGRATIONS: &[&str] = &[];
