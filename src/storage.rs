//! SQLite storage layer for pitchdesk.
//!
//! Holds users, sessions, proposals, and their line items in a single
//! database. Handles schema creation and all CRUD operations; multi-row
//! writes (proposal create, line-item replacement) run inside one
//! transaction so a proposal's stored total never disagrees with its items.
//!
//! Every proposal query takes the owning user id as part of its predicate.
//! A lookup that misses because the row belongs to someone else is
//! indistinguishable from one that misses because the row does not exist.

use std::path::Path;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::totals;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    Decimal(rust_decimal::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Sqlite(e) => write!(f, "sqlite error: {e}"),
            StorageError::Serde(e) => write!(f, "serialization error: {e}"),
            StorageError::Decimal(e) => write!(f, "decimal error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Sqlite(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serde(e)
    }
}

impl From<rust_decimal::Error> for StorageError {
    fn from(e: rust_decimal::Error) -> Self {
        StorageError::Decimal(e)
    }
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// Proposal lifecycle status. Any value may be set by the owner at any
/// time; there is no transition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "PENDING",
            ProposalStatus::Accepted => "ACCEPTED",
            ProposalStatus::Rejected => "REJECTED",
        }
    }
}

impl FromSql for ProposalStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "PENDING" => Ok(ProposalStatus::Pending),
            "ACCEPTED" => Ok(ProposalStatus::Accepted),
            "REJECTED" => Ok(ProposalStatus::Rejected),
            other => Err(FromSqlError::Other(
                format!("unknown proposal status: {other}").into(),
            )),
        }
    }
}

impl ToSql for ProposalStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// User row stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: u64,
}

/// Session row stored in the database. `token_hash` is the hex SHA-256 of
/// the opaque bearer token; the token itself is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: u64,
    pub expires_at: u64,
}

/// Proposal row stored in the database. `total_amount` is derived from the
/// proposal's line items and rewritten whenever they are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRow {
    pub id: String,
    pub user_id: String,
    pub client_info: serde_json::Value,
    pub engagement_type: String,
    pub duration: String,
    pub status: ProposalStatus,
    pub total_amount: Decimal,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Line item row stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRow {
    pub id: String,
    pub proposal_id: String,
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

/// One billable row supplied by a caller when creating or replacing a
/// proposal's line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
}

/// Fields for a new proposal. Status always starts as PENDING.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub client_info: serde_json::Value,
    pub engagement_type: String,
    pub duration: String,
    pub line_items: Vec<LineItemInput>,
}

/// Partial update for a proposal. `None` fields are left untouched. When
/// `line_items` is set, the stored item set is replaced wholesale and the
/// total recomputed in the same transaction.
#[derive(Debug, Clone, Default)]
pub struct ProposalPatch {
    pub client_info: Option<serde_json::Value>,
    pub engagement_type: Option<String>,
    pub duration: Option<String>,
    pub status: Option<ProposalStatus>,
    pub line_items: Option<Vec<LineItemInput>>,
}

/// Per-status proposal counts. Statuses with no rows report zero.
#[derive(Debug, Clone, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub accepted: u64,
    pub rejected: u64,
}

/// Aggregated proposal statistics for one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_proposals: u64,
    pub status_counts: StatusCounts,
    pub total_revenue: Decimal,
    pub average_value: Decimal,
}

// ---------------------------------------------------------------------------
// Raw row decoding
// ---------------------------------------------------------------------------

const PROPOSAL_COLUMNS: &str =
    "id, user_id, client_info, engagement_type, duration, status, total_amount, \
     created_at, updated_at";

/// Proposal columns as fetched, before the JSON and decimal columns are
/// decoded. Decoding happens outside the rusqlite row closure so failures
/// surface as [`StorageError`] rather than being squeezed into
/// `rusqlite::Error`.
struct RawProposal {
    id: String,
    user_id: String,
    client_info: String,
    engagement_type: String,
    duration: String,
    status: ProposalStatus,
    total_amount: String,
    created_at: u64,
    updated_at: u64,
}

impl RawProposal {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawProposal {
            id: row.get(0)?,
            user_id: row.get(1)?,
            client_info: row.get(2)?,
            engagement_type: row.get(3)?,
            duration: row.get(4)?,
            status: row.get(5)?,
            total_amount: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<ProposalRow, StorageError> {
        Ok(ProposalRow {
            client_info: serde_json::from_str(&self.client_info)?,
            total_amount: self.total_amount.parse()?,
            id: self.id,
            user_id: self.user_id,
            engagement_type: self.engagement_type,
            duration: self.duration,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open or create a database at the given path. Creates schema if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    /// Create an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let storage = Self { conn };
        storage.create_schema()?;
        Ok(storage)
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name          TEXT NOT NULL,
                created_at    INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                token_hash  TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at  INTEGER NOT NULL,
                expires_at  INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user
                ON sessions(user_id);

            CREATE TABLE IF NOT EXISTS proposals (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                client_info     TEXT NOT NULL,
                engagement_type TEXT NOT NULL,
                duration        TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'PENDING'
                                CHECK (status IN ('PENDING','ACCEPTED','REJECTED')),
                total_amount    TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                updated_at      INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_proposals_user
                ON proposals(user_id);
            CREATE INDEX IF NOT EXISTS idx_proposals_user_status
                ON proposals(user_id, status);

            CREATE TABLE IF NOT EXISTS line_items (
                id          TEXT PRIMARY KEY,
                proposal_id TEXT NOT NULL REFERENCES proposals(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                quantity    TEXT NOT NULL,
                rate        TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_line_items_proposal
                ON line_items(proposal_id);
            ",
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn insert_user(&self, row: &UserRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO users (id, email, password_hash, name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![row.id, row.email, row.password_hash, row.name, row.created_at],
        )?;
        Ok(())
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, email, password_hash, name, created_at
                 FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        password_hash: row.get(2)?,
                        name: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub fn insert_session(&self, row: &SessionRow) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![row.token_hash, row.user_id, row.created_at, row.expires_at],
        )?;
        Ok(())
    }

    /// Resolve a token hash to its user id. Expired sessions never match.
    pub fn get_session_user(
        &self,
        token_hash: &str,
        now: u64,
    ) -> Result<Option<String>, StorageError> {
        let user_id = self
            .conn
            .query_row(
                "SELECT user_id FROM sessions
                 WHERE token_hash = ?1 AND expires_at > ?2",
                params![token_hash, now],
                |row| row.get(0),
            )
            .optional()?;
        Ok(user_id)
    }

    /// Delete sessions past their expiry. Returns the number removed.
    pub fn purge_expired_sessions(&self, now: u64) -> Result<usize, StorageError> {
        let affected = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
        Ok(affected)
    }

    // -----------------------------------------------------------------------
    // Proposals
    // -----------------------------------------------------------------------

    /// Create a proposal and its line items in one transaction. The stored
    /// total is computed from the supplied items before any row is written;
    /// on failure nothing is inserted.
    pub fn create_proposal(
        &self,
        user_id: &str,
        input: &NewProposal,
        now: u64,
    ) -> Result<(ProposalRow, Vec<LineItemRow>), StorageError> {
        let total = totals::total_amount(&input.line_items);
        let proposal_id = Uuid::new_v4().to_string();
        let client_info = serde_json::to_string(&input.client_info)?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO proposals
             (id, user_id, client_info, engagement_type, duration, status,
              total_amount, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                proposal_id,
                user_id,
                client_info,
                input.engagement_type,
                input.duration,
                ProposalStatus::Pending,
                total.to_string(),
                now,
                now
            ],
        )?;
        let items = insert_line_items(&tx, &proposal_id, &input.line_items)?;
        tx.commit()?;

        let row = ProposalRow {
            id: proposal_id,
            user_id: user_id.to_string(),
            client_info: input.client_info.clone(),
            engagement_type: input.engagement_type.clone(),
            duration: input.duration.clone(),
            status: ProposalStatus::Pending,
            total_amount: total,
            created_at: now,
            updated_at: now,
        };
        Ok((row, items))
    }

    /// All proposals owned by `user_id`, each with its line items, in
    /// store-default order.
    pub fn list_proposals(
        &self,
        user_id: &str,
    ) -> Result<Vec<(ProposalRow, Vec<LineItemRow>)>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE user_id = ?1"
        ))?;
        let raws = stmt.query_map(params![user_id], RawProposal::read)?;

        let mut proposals = Vec::new();
        for raw in raws {
            let row = raw?.decode()?;
            let items = self.list_line_items(&row.id)?;
            proposals.push((row, items));
        }
        Ok(proposals)
    }

    /// The proposal matching both `proposal_id` and `user_id`, with its
    /// line items. `None` covers nonexistence and foreign ownership alike.
    pub fn get_proposal(
        &self,
        user_id: &str,
        proposal_id: &str,
    ) -> Result<Option<(ProposalRow, Vec<LineItemRow>)>, StorageError> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PROPOSAL_COLUMNS} FROM proposals
                     WHERE id = ?1 AND user_id = ?2"
                ),
                params![proposal_id, user_id],
                RawProposal::read,
            )
            .optional()?;

        match raw {
            Some(raw) => {
                let row = raw.decode()?;
                let items = self.list_line_items(&row.id)?;
                Ok(Some((row, items)))
            }
            None => Ok(None),
        }
    }

    /// Apply a partial update to an owned proposal. When the patch carries
    /// line items, the existing set is deleted and replaced and the total
    /// recomputed, all inside the same transaction. Returns `None` when no
    /// owned row matches; nothing is written in that case.
    pub fn update_proposal(
        &self,
        user_id: &str,
        proposal_id: &str,
        patch: &ProposalPatch,
        now: u64,
    ) -> Result<Option<(ProposalRow, Vec<LineItemRow>)>, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let raw = tx
            .query_row(
                &format!(
                    "SELECT {PROPOSAL_COLUMNS} FROM proposals
                     WHERE id = ?1 AND user_id = ?2"
                ),
                params![proposal_id, user_id],
                RawProposal::read,
            )
            .optional()?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut row = raw.decode()?;

        if let Some(client_info) = &patch.client_info {
            row.client_info = client_info.clone();
        }
        if let Some(engagement_type) = &patch.engagement_type {
            row.engagement_type = engagement_type.clone();
        }
        if let Some(duration) = &patch.duration {
            row.duration = duration.clone();
        }
        if let Some(status) = patch.status {
            row.status = status;
        }

        let items = match &patch.line_items {
            Some(new_items) => {
                tx.execute(
                    "DELETE FROM line_items WHERE proposal_id = ?1",
                    params![proposal_id],
                )?;
                row.total_amount = totals::total_amount(new_items);
                insert_line_items(&tx, proposal_id, new_items)?
            }
            None => self.list_line_items(proposal_id)?,
        };
        row.updated_at = now;

        tx.execute(
            "UPDATE proposals
             SET client_info = ?1, engagement_type = ?2, duration = ?3,
                 status = ?4, total_amount = ?5, updated_at = ?6
             WHERE id = ?7 AND user_id = ?8",
            params![
                serde_json::to_string(&row.client_info)?,
                row.engagement_type,
                row.duration,
                row.status,
                row.total_amount.to_string(),
                row.updated_at,
                proposal_id,
                user_id
            ],
        )?;
        tx.commit()?;

        Ok(Some((row, items)))
    }

    /// Delete a proposal scoped by `(id, user_id)`; line items go with it
    /// via cascade. Returns whether a row was actually removed. The
    /// ownership check lives in the delete predicate itself.
    pub fn delete_proposal(&self, user_id: &str, proposal_id: &str) -> Result<bool, StorageError> {
        let affected = self.conn.execute(
            "DELETE FROM proposals WHERE id = ?1 AND user_id = ?2",
            params![proposal_id, user_id],
        )?;
        Ok(affected > 0)
    }

    pub fn list_line_items(&self, proposal_id: &str) -> Result<Vec<LineItemRow>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, proposal_id, description, quantity, rate
             FROM line_items WHERE proposal_id = ?1",
        )?;
        let rows = stmt.query_map(params![proposal_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (id, proposal_id, description, quantity, rate) = row?;
            items.push(LineItemRow {
                id,
                proposal_id,
                description,
                quantity: quantity.parse()?,
                rate: rate.parse()?,
            });
        }
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // Dashboard
    // -----------------------------------------------------------------------

    /// Aggregate proposal statistics for one user, read in a single
    /// transaction so all four figures come from the same snapshot.
    pub fn dashboard_summary(&self, user_id: &str) -> Result<DashboardSummary, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let total_proposals: u64 = tx.query_row(
            "SELECT COUNT(*) FROM proposals WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        let mut counts = StatusCounts {
            pending: 0,
            accepted: 0,
            rejected: 0,
        };
        {
            let mut stmt = tx.prepare(
                "SELECT status, COUNT(*) FROM proposals
                 WHERE user_id = ?1 GROUP BY status",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                Ok((row.get::<_, ProposalStatus>(0)?, row.get::<_, u64>(1)?))
            })?;
            for row in rows {
                let (status, count) = row?;
                match status {
                    ProposalStatus::Pending => counts.pending = count,
                    ProposalStatus::Accepted => counts.accepted = count,
                    ProposalStatus::Rejected => counts.rejected = count,
                }
            }
        }

        let mut total_revenue = Decimal::ZERO;
        let mut accepted_count: u64 = 0;
        {
            let mut stmt = tx.prepare(
                "SELECT total_amount FROM proposals
                 WHERE user_id = ?1 AND status = 'ACCEPTED'",
            )?;
            let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
            for row in rows {
                total_revenue += row?.parse::<Decimal>()?;
                accepted_count += 1;
            }
        }
        tx.commit()?;

        let average_value = if accepted_count == 0 {
            Decimal::ZERO
        } else {
            total_revenue / Decimal::from(accepted_count)
        };

        Ok(DashboardSummary {
            total_proposals,
            status_counts: counts,
            total_revenue,
            average_value,
        })
    }

    /// Cheap liveness probe for the health endpoint.
    pub fn ping(&self) -> Result<(), StorageError> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

/// Insert line-item rows bound to a proposal within an open transaction.
fn insert_line_items(
    tx: &rusqlite::Transaction<'_>,
    proposal_id: &str,
    items: &[LineItemInput],
) -> Result<Vec<LineItemRow>, StorageError> {
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let id = Uuid::new_v4().to_string();
        tx.execute(
            "INSERT INTO line_items (id, proposal_id, description, quantity, rate)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                proposal_id,
                item.description,
                item.quantity.to_string(),
                item.rate.to_string()
            ],
        )?;
        rows.push(LineItemRow {
            id,
            proposal_id: proposal_id.to_string(),
            description: item.description.clone(),
            quantity: item.quantity,
            rate: item.rate,
        });
    }
    Ok(rows)
}
