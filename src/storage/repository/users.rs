// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository.
//!
//! Usernames and emails are unique on their normalized form (NFKC, trimmed,
//! lowercased). The `usernames` and `emails` tables map that form to the
//! user id, so the uniqueness check and the insert share one transaction.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use super::super::database::{next_id, read_record, tables, write_record};
use super::super::{Database, StorageError, StorageResult};
use crate::models::UserId;

/// User stored in the planner database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Argon2 PHC string. Never leaves the server.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password_hash: String,
}

/// Normalize an identifier for uniqueness checks and lookups.
pub fn normalize_identifier(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get a user by ID.
    pub fn get(&self, user_id: UserId) -> StorageResult<StoredUser> {
        self.find(user_id)?
            .ok_or_else(|| StorageError::NotFound(format!("User {user_id}")))
    }

    /// Get a user by ID, `None` if absent.
    pub fn find(&self, user_id: UserId) -> StorageResult<Option<StoredUser>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::USERS)?;
        read_record(&table, user_id)
    }

    /// Look up a user by username (normalized).
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        let key = normalize_identifier(username);
        let txn = self.db.read()?;
        let index = txn.open_table(tables::USERNAMES)?;
        let Some(user_id) = index.get(key.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };
        let table = txn.open_table(tables::USERS)?;
        read_record(&table, user_id)
    }

    /// Create a user, enforcing unique username and email.
    pub fn create(&self, new_user: NewUser) -> StorageResult<StoredUser> {
        let username_key = normalize_identifier(&new_user.username);
        let email_key = normalize_identifier(&new_user.email);

        let txn = self.db.write()?;
        let user = {
            let mut usernames = txn.open_table(tables::USERNAMES)?;
            if usernames.get(username_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(
                    "Username already registered".to_string(),
                ));
            }
            let mut emails = txn.open_table(tables::EMAILS)?;
            if emails.get(email_key.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(
                    "Email already registered".to_string(),
                ));
            }

            let user = StoredUser {
                id: next_id(&txn, "users")?,
                username: new_user.username.trim().to_string(),
                email: new_user.email.trim().to_string(),
                full_name: new_user.full_name,
                password_hash: new_user.password_hash,
                created_at: Utc::now(),
            };

            usernames.insert(username_key.as_str(), user.id)?;
            emails.insert(email_key.as_str(), user.id)?;
            let mut table = txn.open_table(tables::USERS)?;
            write_record(&mut table, user.id, &user)?;
            user
        };
        txn.commit()?;
        Ok(user)
    }

    /// Load several users, skipping ids that no longer resolve.
    pub fn get_many(&self, user_ids: &[UserId]) -> StorageResult<Vec<StoredUser>> {
        let txn = self.db.read()?;
        let table = txn.open_table(tables::USERS)?;
        let mut users = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if let Some(user) = read_record(&table, *id)? {
                users.push(user);
            }
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            full_name: None,
            password_hash: "$argon2id$test".to_string(),
        }
    }

    #[test]
    fn create_and_get_user() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(&db);

        let user = repo.create(new_user("alice", "alice@example.com")).unwrap();
        assert_eq!(user.id, 1);

        let loaded = repo.get(user.id).unwrap();
        assert_eq!(loaded, user);
    }

    #[test]
    fn username_lookup_is_normalized() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(&db);

        let user = repo.create(new_user("Alice", "alice@example.com")).unwrap();

        let found = repo.find_by_username("  ALICE ").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.username, "Alice");
        assert!(repo.find_by_username("bob").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_or_email_rejected() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(&db);

        repo.create(new_user("alice", "alice@example.com")).unwrap();

        let dup_name = repo.create(new_user("ALICE", "other@example.com"));
        assert!(matches!(
            dup_name,
            Err(StorageError::AlreadyExists(msg)) if msg.contains("Username")
        ));

        let dup_email = repo.create(new_user("alice2", "Alice@Example.com"));
        assert!(matches!(
            dup_email,
            Err(StorageError::AlreadyExists(msg)) if msg.contains("Email")
        ));
    }

    #[test]
    fn missing_user_is_not_found() {
        let db = Database::in_memory().unwrap();
        let repo = UserRepository::new(&db);

        assert!(matches!(repo.get(42), Err(StorageError::NotFound(_))));
        assert!(repo.get_many(&[42]).unwrap().is_empty());
    }
}
