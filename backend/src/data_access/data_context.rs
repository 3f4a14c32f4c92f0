use redb::{Database, ReadableTable, TableDefinition};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::{task::Task, user::{normalize_email, User}};

/// postcard-encoded [`Task`] keyed by id.
const TASKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("tasks");
/// JSON-encoded [`User`]; preferences are schemaless, which postcard cannot carry.
const USERS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("users");
const EMAIL_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("email_index");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redb: {0}")]
    Redb(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("encode: {0}")]
    Encode(String),

    #[error("email already registered: {0}")]
    EmailTaken(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Opens (or creates) the database file and makes sure every table exists.
    pub fn new(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TASKS_TABLE)?;
            let _ = write_txn.open_table(USERS_TABLE)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
        }
        write_txn.commit()?;
        tracing::info!(path, "database opened");
        Ok(DataContext { db: Arc::new(db) })
    }

    // USERS

    /// Fails with [`StoreError::EmailTaken`] when the email is already indexed.
    pub fn create_user(&self, user: &User) -> Result<(), StoreError> {
        let user_bytes = encode_user(user)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            if email_index.get(user.email.as_str())?.is_some() {
                return Err(StoreError::EmailTaken(user.email.clone()));
            }
            let mut users_table = write_txn.open_table(USERS_TABLE)?;
            let id_bytes = user.id.as_bytes();
            users_table.insert(id_bytes.as_slice(), user_bytes.as_slice())?;
            email_index.insert(user.email.as_str(), id_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let users_table = read_txn.open_table(USERS_TABLE)?;
        let id_bytes = id.as_bytes();
        match users_table.get(id_bytes.as_slice())? {
            Some(data) => Ok(Some(decode_user(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        let read_txn = self.db.begin_read()?;
        let email_index = read_txn.open_table(EMAIL_INDEX)?;

        match email_index.get(email.as_str())? {
            Some(id_data) => {
                let users_table = read_txn.open_table(USERS_TABLE)?;
                match users_table.get(id_data.value())? {
                    Some(user_data) => Ok(Some(decode_user(user_data.value())?)),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    /// Email is immutable after registration, so the index is left alone.
    pub fn update_user(&self, user: &User) -> Result<bool, StoreError> {
        let user_bytes = encode_user(user)?;
        let write_txn = self.db.begin_write()?;
        let existed;
        {
            let mut users_table = write_txn.open_table(USERS_TABLE)?;
            let id_bytes = user.id.as_bytes();
            existed = users_table.get(id_bytes.as_slice())?.is_some();
            if existed {
                users_table.insert(id_bytes.as_slice(), user_bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(existed)
    }

    // TASKS

    /// Inserts or replaces.
    pub fn save_task(&self, task: &Task) -> Result<(), StoreError> {
        let task_bytes = postcard::to_allocvec(task).map_err(|e| StoreError::Encode(e.to_string()))?;
        let write_txn = self.db.begin_write()?;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let id_bytes = task.id.as_bytes();
            tasks_table.insert(id_bytes.as_slice(), task_bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;
        let id_bytes = id.as_bytes();
        match tasks_table.get(id_bytes.as_slice())? {
            Some(data) => Ok(Some(decode_task(data.value())?)),
            None => Ok(None),
        }
    }

    /// A task owned by someone else reads as absent.
    pub fn get_task_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.get_task(id)?.filter(|t| t.user_id == user_id))
    }

    /// All tasks of one owner, newest first.
    pub fn list_tasks_for_user(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let tasks_table = read_txn.open_table(TASKS_TABLE)?;

        let mut tasks = Vec::new();
        for entry in tasks_table.iter()? {
            let (_, value) = entry?;
            let task = decode_task(value.value())?;
            if task.user_id == user_id {
                tasks.push(task);
            }
        }
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks_table = write_txn.open_table(TASKS_TABLE)?;
            let id_bytes = id.as_bytes();
            deleted = tasks_table.remove(id_bytes.as_slice())?.is_some();
        }
        write_txn.commit()?;
        Ok(deleted)
    }
}

fn decode_task(bytes: &[u8]) -> Result<Task, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn encode_user(user: &User) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(user).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode_user(bytes: &[u8]) -> Result<User, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

// ── Tests ──────────────────────────────────────────────────────
