// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded planner database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `sequences`: sequence name → last issued id
//! - `users`, `friend_requests`, `contacts`, `events`, `recipients`, `gifts`:
//!   id → serialized record (JSON bytes)
//! - `usernames` / `emails`: normalized key → user id (uniqueness)
//! - `friend_pairs`: (low user id, high user id) → friend request id
//! - `friend_links`: (user id, request id) → () for both parties
//! - `contacts_by_owner`, `events_by_owner`: (owner id, id) → ()
//! - `recipients_by_event`, `recipients_by_contact`, `gifts_by_recipient`:
//!   (parent id, child id) → ()
//! - `contact_grants`, `event_grants`: (resource id, user id) → permission
//! - `contact_grants_by_user`, `event_grants_by_user`: (user id, resource id) → ()
//! - `audit_log`: sequence → serialized audit event
//!
//! Every logical operation runs in a single write transaction, so composite
//! keys double as unique constraints and multi-table cascades commit
//! atomically.

use std::path::Path;

use redb::backends::InMemoryBackend;
use redb::{
    ReadTransaction, ReadableDatabase, ReadableTable, Table, TableDefinition,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) mod tables {
    use redb::TableDefinition;

    pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

    pub const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");
    pub const USERNAMES: TableDefinition<&str, u64> = TableDefinition::new("usernames");
    pub const EMAILS: TableDefinition<&str, u64> = TableDefinition::new("emails");

    pub const FRIEND_REQUESTS: TableDefinition<u64, &[u8]> =
        TableDefinition::new("friend_requests");
    pub const FRIEND_PAIRS: TableDefinition<(u64, u64), u64> = TableDefinition::new("friend_pairs");
    pub const FRIEND_LINKS: TableDefinition<(u64, u64), ()> = TableDefinition::new("friend_links");

    pub const CONTACTS: TableDefinition<u64, &[u8]> = TableDefinition::new("contacts");
    pub const CONTACTS_BY_OWNER: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("contacts_by_owner");

    pub const EVENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("events");
    pub const EVENTS_BY_OWNER: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("events_by_owner");

    pub const RECIPIENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("recipients");
    pub const RECIPIENTS_BY_EVENT: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("recipients_by_event");
    pub const RECIPIENTS_BY_CONTACT: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("recipients_by_contact");

    pub const GIFTS: TableDefinition<u64, &[u8]> = TableDefinition::new("gifts");
    pub const GIFTS_BY_RECIPIENT: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("gifts_by_recipient");

    pub const CONTACT_GRANTS: TableDefinition<(u64, u64), &str> =
        TableDefinition::new("contact_grants");
    pub const CONTACT_GRANTS_BY_USER: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("contact_grants_by_user");
    pub const EVENT_GRANTS: TableDefinition<(u64, u64), &str> =
        TableDefinition::new("event_grants");
    pub const EVENT_GRANTS_BY_USER: TableDefinition<(u64, u64), ()> =
        TableDefinition::new("event_grants_by_user");

    pub const AUDIT_LOG: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_log");
}

use tables::*;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("still referenced: {0}")]
    InUse(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Record Helpers
// =============================================================================

/// Read and deserialize the JSON record stored under `id`.
pub(crate) fn read_record<T, Tbl>(table: &Tbl, id: u64) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    Tbl: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Serialize `value` as JSON and store it under `id`.
pub(crate) fn write_record<T: Serialize>(
    table: &mut Table<'_, u64, &'static [u8]>,
    id: u64,
    value: &T,
) -> StorageResult<()> {
    let json = serde_json::to_vec(value)?;
    table.insert(id, json.as_slice())?;
    Ok(())
}

/// Collect the child ids of a `(parent, child) → ()` index for one parent.
///
/// Results come back in ascending child id order.
pub(crate) fn children_of<Tbl, V>(index: &Tbl, parent: u64) -> StorageResult<Vec<u64>>
where
    Tbl: ReadableTable<(u64, u64), V>,
    V: redb::Value + 'static,
{
    let mut ids = Vec::new();
    for entry in index.range((parent, 0)..=(parent, u64::MAX))? {
        let (key, _) = entry?;
        ids.push(key.value().1);
    }
    Ok(ids)
}

/// Issue the next id from a named sequence. Ids start at 1.
pub(crate) fn next_id(txn: &WriteTransaction, sequence: &str) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let next = table.get(sequence)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID planner database.
pub struct Database {
    db: redb::Database,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = redb::Database::create(path)?;
        Self::from_redb(db)
    }

    /// Create a database that lives only in memory. Used by tests.
    pub fn in_memory() -> StorageResult<Self> {
        let db = redb::Database::builder().create_with_backend(InMemoryBackend::new())?;
        Self::from_redb(db)
    }

    fn from_redb(db: redb::Database) -> StorageResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SEQUENCES)?;
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAMES)?;
            let _ = write_txn.open_table(EMAILS)?;
            let _ = write_txn.open_table(FRIEND_REQUESTS)?;
            let _ = write_txn.open_table(FRIEND_PAIRS)?;
            let _ = write_txn.open_table(FRIEND_LINKS)?;
            let _ = write_txn.open_table(CONTACTS)?;
            let _ = write_txn.open_table(CONTACTS_BY_OWNER)?;
            let _ = write_txn.open_table(EVENTS)?;
            let _ = write_txn.open_table(EVENTS_BY_OWNER)?;
            let _ = write_txn.open_table(RECIPIENTS)?;
            let _ = write_txn.open_table(RECIPIENTS_BY_EVENT)?;
            let _ = write_txn.open_table(RECIPIENTS_BY_CONTACT)?;
            let _ = write_txn.open_table(GIFTS)?;
            let _ = write_txn.open_table(GIFTS_BY_RECIPIENT)?;
            let _ = write_txn.open_table(CONTACT_GRANTS)?;
            let _ = write_txn.open_table(CONTACT_GRANTS_BY_USER)?;
            let _ = write_txn.open_table(EVENT_GRANTS)?;
            let _ = write_txn.open_table(EVENT_GRANTS_BY_USER)?;
            let _ = write_txn.open_table(AUDIT_LOG)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn read(&self) -> StorageResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    pub(crate) fn write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    /// Verify the database answers a read transaction.
    pub fn health_check(&self) -> StorageResult<()> {
        let txn = self.read()?;
        let table = txn.open_table(SEQUENCES)?;
        let _ = table.get("users")?;
        Ok(())
    }
}

/// Grant and reverse-index table shapes, selected per shareable kind.
pub(crate) type GrantTable = TableDefinition<'static, (u64, u64), &'static str>;
pub(crate) type IndexTable = TableDefinition<'static, (u64, u64), ()>;
