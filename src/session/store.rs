//! SQLite-backed session store: lifecycle rows plus an append-only log.
//!
//! The store is the one piece of state shared across invocations. Every
//! mutating operation runs inside a single transaction so a concurrent reader
//! observes either the fully-prior or the fully-new state; the `start`
//! auto-end/insert pair in particular can never leave zero or two active rows
//! visible for an identity.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::config::get_home_dir;
use crate::error::{Error, Result};

use super::identity::Identity;

/// Lifecycle state of a session row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
    AutoEnded,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::AutoEnded => "auto_ended",
        }
    }

    fn from_db(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(SessionStatus::Active),
            "completed" => Ok(SessionStatus::Completed),
            "auto_ended" => Ok(SessionStatus::AutoEnded),
            other => Err(Error::Storage(format!("unknown session status: {}", other))),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event type of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Start,
    Save,
    End,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Start => "start",
            EventType::Save => "save",
            EventType::End => "end",
        }
    }

    fn from_db(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(EventType::Start),
            "save" => Ok(EventType::Save),
            "end" => Ok(EventType::End),
            other => Err(Error::Storage(format!("unknown event type: {}", other))),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One session lifecycle instance. Rows are never physically deleted.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: i64,
    pub identity: Identity,
    pub name: Option<String>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub status: SessionStatus,
    pub metadata: serde_json::Value,
}

/// One append-only log entry, foreign-keyed to a session.
#[derive(Debug, Clone)]
pub struct SessionLogEntry {
    pub id: String,
    pub session_id: i64,
    pub ts: i64,
    pub event_type: EventType,
    pub message: Option<String>,
}

/// Store-level counters for the `status` view.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    pub total_sessions: u64,
    pub total_logs: u64,
    pub active_sessions: u64,
}

/// Default on-disk location: `~/.crew/db/sessions.db`.
pub fn default_db_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("db").join("sessions.db"))
}

pub struct SessionStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Open (and initialize) the store at the default location.
    pub fn open_default() -> Result<Self> {
        Self::open(&default_db_path()?)
    }

    /// Open (and initialize) the store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| Error::Storage(format!("sqlite open: {}", e)))?;
        init_schema(&conn)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Storage(format!("sqlite open: {}", e)))?;
        init_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Start a new session for `identity`.
    ///
    /// Auto-ending any previously active session, inserting the new active
    /// row, and appending the `start` log entry are one transaction.
    pub fn start(&mut self, identity: Identity, name: Option<&str>) -> Result<i64> {
        let now = now_millis();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::Storage(format!("sqlite begin: {}", e)))?;

        let auto_ended = tx
            .execute(
                "UPDATE sessions SET status = 'auto_ended', ended_at = ?1
                 WHERE identity = ?2 AND status = 'active'",
                params![now, identity.key()],
            )
            .map_err(|e| Error::Storage(format!("sqlite auto-end: {}", e)))?;

        let metadata = serde_json::json!({
            "tool": "crewcmd",
            "version": env!("CARGO_PKG_VERSION"),
        });
        tx.execute(
            "INSERT INTO sessions (identity, name, started_at, status, metadata)
             VALUES (?1, ?2, ?3, 'active', ?4)",
            params![identity.key(), name, now, metadata.to_string()],
        )
        .map_err(|e| Error::Storage(format!("sqlite insert session: {}", e)))?;
        let session_id = tx.last_insert_rowid();

        append_log(
            &tx,
            session_id,
            now,
            EventType::Start,
            Some(&format!("Session started for {}", identity)),
        )?;

        tx.commit()
            .map_err(|e| Error::Storage(format!("sqlite commit: {}", e)))?;

        if auto_ended > 0 {
            tracing::info!(
                "Auto-ended {} previous session(s) for {}",
                auto_ended,
                identity
            );
        }
        tracing::info!("Started session {} for {}", session_id, identity);
        Ok(session_id)
    }

    /// Append a `save` log entry to the active session for `identity`.
    /// No session fields change.
    pub fn save(&mut self, identity: Identity, message: Option<&str>) -> Result<i64> {
        let now = now_millis();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::Storage(format!("sqlite begin: {}", e)))?;

        let session_id = active_id(&tx, identity)?
            .ok_or_else(|| Error::NoActiveSession(identity.key().to_string()))?;

        let message = message.filter(|m| !m.is_empty()).unwrap_or("Session state saved");
        append_log(&tx, session_id, now, EventType::Save, Some(message))?;

        tx.commit()
            .map_err(|e| Error::Storage(format!("sqlite commit: {}", e)))?;
        Ok(session_id)
    }

    /// End the active session for `identity`: status `completed`, end
    /// timestamp set, `end` log entry appended, all in one transaction.
    pub fn end(&mut self, identity: Identity) -> Result<i64> {
        let now = now_millis();
        let tx = self
            .conn
            .transaction()
            .map_err(|e| Error::Storage(format!("sqlite begin: {}", e)))?;

        let session_id = active_id(&tx, identity)?
            .ok_or_else(|| Error::NoActiveSession(identity.key().to_string()))?;

        tx.execute(
            "UPDATE sessions SET status = 'completed', ended_at = ?1 WHERE id = ?2",
            params![now, session_id],
        )
        .map_err(|e| Error::Storage(format!("sqlite end session: {}", e)))?;

        append_log(
            &tx,
            session_id,
            now,
            EventType::End,
            Some(&format!("Session ended for {}", identity)),
        )?;

        tx.commit()
            .map_err(|e| Error::Storage(format!("sqlite commit: {}", e)))?;
        tracing::info!("Ended session {} for {}", session_id, identity);
        Ok(session_id)
    }

    /// The active session for `identity`, if any. The exclusivity invariant
    /// guarantees at most one row; ordering is a defensive tie-break only.
    pub fn active_session(&self, identity: Identity) -> Result<Option<Session>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, identity, name, started_at, ended_at, status, metadata
                 FROM sessions
                 WHERE identity = ?1 AND status = 'active'
                 ORDER BY started_at DESC, id DESC
                 LIMIT 1",
                params![identity.key()],
                row_to_raw,
            )
            .optional()
            .map_err(|e| Error::Storage(format!("sqlite query active: {}", e)))?;

        raw.map(raw_to_session).transpose()
    }

    /// All log entries for a session, oldest first.
    pub fn session_logs(&self, session_id: i64) -> Result<Vec<SessionLogEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, session_id, ts, event_type, message
                 FROM session_logs WHERE session_id = ?1 ORDER BY ts, id",
            )
            .map_err(|e| Error::Storage(format!("sqlite prepare logs: {}", e)))?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| Error::Storage(format!("sqlite query logs: {}", e)))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, session_id, ts, event_type, message) =
                row.map_err(|e| Error::Storage(format!("sqlite read log: {}", e)))?;
            entries.push(SessionLogEntry {
                id,
                session_id,
                ts,
                event_type: EventType::from_db(&event_type)?,
                message,
            });
        }
        Ok(entries)
    }

    /// Recent sessions, newest first, optionally filtered by identity.
    pub fn list_sessions(&self, identity: Option<Identity>, limit: usize) -> Result<Vec<Session>> {
        let raws: Vec<RawSession> = match identity {
            Some(id) => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT id, identity, name, started_at, ended_at, status, metadata
                         FROM sessions WHERE identity = ?1
                         ORDER BY started_at DESC, id DESC LIMIT ?2",
                    )
                    .map_err(|e| Error::Storage(format!("sqlite prepare list: {}", e)))?;
                let rows = stmt
                    .query_map(params![id.key(), limit as i64], row_to_raw)
                    .map_err(|e| Error::Storage(format!("sqlite query list: {}", e)))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(|e| Error::Storage(format!("sqlite read session: {}", e)))?
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(
                        "SELECT id, identity, name, started_at, ended_at, status, metadata
                         FROM sessions ORDER BY started_at DESC, id DESC LIMIT ?1",
                    )
                    .map_err(|e| Error::Storage(format!("sqlite prepare list: {}", e)))?;
                let rows = stmt
                    .query_map(params![limit as i64], row_to_raw)
                    .map_err(|e| Error::Storage(format!("sqlite query list: {}", e)))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(|e| Error::Storage(format!("sqlite read session: {}", e)))?
            }
        };

        raws.into_iter().map(raw_to_session).collect()
    }

    /// Row counts for the `status` view.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<u64> {
            self.conn
                .query_row(sql, [], |row| row.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(|e| Error::Storage(format!("sqlite count: {}", e)))
        };

        Ok(StoreStats {
            total_sessions: count("SELECT COUNT(*) FROM sessions")?,
            total_logs: count("SELECT COUNT(*) FROM session_logs")?,
            active_sessions: count("SELECT COUNT(*) FROM sessions WHERE status = 'active'")?,
        })
    }
}

type RawSession = (i64, String, Option<String>, i64, Option<i64>, String, String);

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSession> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn raw_to_session(raw: RawSession) -> Result<Session> {
    let (id, identity, name, started_at, ended_at, status, metadata) = raw;
    Ok(Session {
        id,
        identity: identity
            .parse()
            .map_err(|_| Error::Storage(format!("unknown identity in store: {}", identity)))?,
        name,
        started_at,
        ended_at,
        status: SessionStatus::from_db(&status)?,
        metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::Value::Null),
    })
}

fn active_id(conn: &Connection, identity: Identity) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM sessions WHERE identity = ?1 AND status = 'active'
         ORDER BY started_at DESC, id DESC LIMIT 1",
        params![identity.key()],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| Error::Storage(format!("sqlite query active id: {}", e)))
}

fn append_log(
    conn: &Connection,
    session_id: i64,
    ts: i64,
    event_type: EventType,
    message: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO session_logs (id, session_id, ts, event_type, message)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ulid::Ulid::new().to_string(),
            session_id,
            ts,
            event_type.as_str(),
            message
        ],
    )
    .map_err(|e| Error::Storage(format!("sqlite insert log: {}", e)))?;
    Ok(())
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identity TEXT NOT NULL,
            name TEXT,
            started_at INTEGER NOT NULL,
            ended_at INTEGER,
            status TEXT NOT NULL DEFAULT 'active',
            metadata TEXT NOT NULL DEFAULT '{}'
        );
        CREATE TABLE IF NOT EXISTS session_logs (
            id TEXT PRIMARY KEY,
            session_id INTEGER NOT NULL,
            ts INTEGER NOT NULL,
            event_type TEXT NOT NULL,
            message TEXT,
            FOREIGN KEY (session_id) REFERENCES sessions (id)
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_identity ON sessions (identity, status);
        CREATE INDEX IF NOT EXISTS idx_session_logs_session ON session_logs (session_id, ts);
        "#,
    )
    .map_err(|e| Error::Storage(format!("sqlite init: {}", e)))?;
    Ok(())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::open_in_memory().unwrap()
    }

    fn active_count(store: &SessionStore, identity: Identity) -> i64 {
        store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sessions WHERE identity = ?1 AND status = 'active'",
                params![identity.key()],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn start_creates_one_active_session() {
        let mut store = store();
        let id = store.start(Identity::Claude1, Some("migration")).unwrap();

        let active = store.active_session(Identity::Claude1).unwrap().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.status, SessionStatus::Active);
        assert_eq!(active.name.as_deref(), Some("migration"));
        assert!(active.ended_at.is_none());
        assert_eq!(active_count(&store, Identity::Claude1), 1);
    }

    #[test]
    fn restart_auto_ends_previous_session() {
        let mut store = store();
        let first = store.start(Identity::Claude1, None).unwrap();
        store.save(Identity::Claude1, Some("checkpoint")).unwrap();
        let second = store.start(Identity::Claude1, None).unwrap();

        assert_ne!(first, second);
        assert_eq!(active_count(&store, Identity::Claude1), 1);

        let active = store.active_session(Identity::Claude1).unwrap().unwrap();
        assert_eq!(active.id, second);

        let old = store
            .list_sessions(Some(Identity::Claude1), 10)
            .unwrap()
            .into_iter()
            .find(|s| s.id == first)
            .unwrap();
        assert_eq!(old.status, SessionStatus::AutoEnded);
        assert!(old.ended_at.is_some());

        // Save logs of the auto-ended session survive untouched.
        let old_logs = store.session_logs(first).unwrap();
        assert!(old_logs
            .iter()
            .any(|l| l.event_type == EventType::Save
                && l.message.as_deref() == Some("checkpoint")));
    }

    #[test]
    fn save_appends_log_without_touching_session() {
        let mut store = store();
        let id = store.start(Identity::Aider1, None).unwrap();
        let before = store.active_session(Identity::Aider1).unwrap().unwrap();

        store.save(Identity::Aider1, None).unwrap();
        store.save(Identity::Aider1, Some("halfway")).unwrap();

        let after = store.active_session(Identity::Aider1).unwrap().unwrap();
        assert_eq!(after.status, SessionStatus::Active);
        assert_eq!(after.started_at, before.started_at);
        assert!(after.ended_at.is_none());

        let logs = store.session_logs(id).unwrap();
        let saves: Vec<_> = logs
            .iter()
            .filter(|l| l.event_type == EventType::Save)
            .collect();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].message.as_deref(), Some("Session state saved"));
        assert_eq!(saves[1].message.as_deref(), Some("halfway"));
    }

    #[test]
    fn end_completes_session_and_logs() {
        let mut store = store();
        let id = store.start(Identity::Claude2, None).unwrap();
        let ended = store.end(Identity::Claude2).unwrap();
        assert_eq!(id, ended);

        assert!(store.active_session(Identity::Claude2).unwrap().is_none());
        let session = store
            .list_sessions(Some(Identity::Claude2), 1)
            .unwrap()
            .remove(0);
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.ended_at.is_some());

        let events: Vec<_> = store
            .session_logs(id)
            .unwrap()
            .into_iter()
            .map(|l| l.event_type)
            .collect();
        assert_eq!(events, vec![EventType::Start, EventType::End]);
    }

    #[test]
    fn save_and_end_without_active_session_leave_store_unmodified() {
        let mut store = store();
        let before = store.stats().unwrap();

        assert!(matches!(
            store.save(Identity::Claude1, None),
            Err(Error::NoActiveSession(_))
        ));
        assert!(matches!(
            store.end(Identity::Claude1),
            Err(Error::NoActiveSession(_))
        ));

        let after = store.stats().unwrap();
        assert_eq!(before.total_sessions, after.total_sessions);
        assert_eq!(before.total_logs, after.total_logs);
    }

    #[test]
    fn exclusivity_holds_over_mixed_sequences() {
        let mut store = store();
        store.start(Identity::Claude1, None).unwrap();
        store.start(Identity::Claude1, None).unwrap();
        store.save(Identity::Claude1, None).unwrap();
        store.end(Identity::Claude1).unwrap();
        store.start(Identity::Claude1, Some("third")).unwrap();
        store.start(Identity::Claude1, None).unwrap();

        assert_eq!(active_count(&store, Identity::Claude1), 1);
    }

    #[test]
    fn identities_do_not_share_sessions() {
        let mut store = store();
        store.start(Identity::Claude1, None).unwrap();
        store.start(Identity::Claude2, None).unwrap();

        assert_eq!(active_count(&store, Identity::Claude1), 1);
        assert_eq!(active_count(&store, Identity::Claude2), 1);

        store.end(Identity::Claude1).unwrap();
        assert!(store.active_session(Identity::Claude1).unwrap().is_none());
        assert!(store.active_session(Identity::Claude2).unwrap().is_some());
    }

    #[test]
    fn list_sessions_filters_and_limits() {
        let mut store = store();
        store.start(Identity::Claude1, None).unwrap();
        store.start(Identity::Claude2, None).unwrap();
        store.start(Identity::Claude1, None).unwrap();

        let all = store.list_sessions(None, 10).unwrap();
        assert_eq!(all.len(), 3);

        let cl1 = store.list_sessions(Some(Identity::Claude1), 10).unwrap();
        assert_eq!(cl1.len(), 2);
        assert!(cl1.iter().all(|s| s.identity == Identity::Claude1));

        let limited = store.list_sessions(None, 1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.db");

        let id = {
            let mut store = SessionStore::open(&path).unwrap();
            store.start(Identity::Aider2, Some("durable")).unwrap()
        };

        let store = SessionStore::open(&path).unwrap();
        let active = store.active_session(Identity::Aider2).unwrap().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.name.as_deref(), Some("durable"));
        assert_eq!(store.session_logs(id).unwrap().len(), 1);
    }
}
