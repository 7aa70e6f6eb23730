// Account persistence. Password hashing happens at the call sites; this
// module only ever sees finished hashes.
use rusqlite::{params, Connection, Row};

use crate::db::models::{Account, Role};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, role, phone_number, address, \
     reset_token, reset_token_expires_at, created_at";

pub struct AccountRepository {
    pool: DbPool,
}

impl AccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an account. Email uniqueness is checked up front so the caller
    /// gets a typed Conflict instead of a raw constraint error.
    pub fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        phone_number: Option<&str>,
        address: Option<&str>,
    ) -> AppResult<Account> {
        let conn = self.pool.get()?;

        let taken: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM accounts WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )?;
        if taken {
            return Err(AppError::Conflict("Email already in use.".into()));
        }

        let id = uuid::Uuid::now_v7().to_string();
        conn.execute(
            "INSERT INTO accounts (id, name, email, password_hash, role, phone_number, address)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                name.trim(),
                email.trim(),
                password_hash,
                role.as_str(),
                phone_number,
                address,
            ],
        )?;

        // Release the connection before find_by_id re-acquires from the pool,
        // otherwise a size-1 pool deadlocks.
        drop(conn);
        self.find_by_id(&id)?
            .ok_or_else(|| AppError::Internal("Created account not found".into()))
    }

    pub fn find_by_id(&self, id: &str) -> AppResult<Option<Account>> {
        let conn = self.pool.get()?;
        fetch_one(
            &conn,
            &format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS),
            params![id],
        )
    }

    pub fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let conn = self.pool.get()?;
        fetch_one(
            &conn,
            &format!("SELECT {} FROM accounts WHERE email = ?1", ACCOUNT_COLUMNS),
            params![email.trim()],
        )
    }

    /// Update the mutable profile fields. A blank name keeps the stored one;
    /// phone and address are overwritten only when supplied.
    pub fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        phone_number: Option<&str>,
        address: Option<&str>,
    ) -> AppResult<Account> {
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE accounts
             SET name = COALESCE(NULLIF(TRIM(?1), ''), name),
                 phone_number = COALESCE(?2, phone_number),
                 address = COALESCE(?3, address),
                 updated_at = datetime('now')
             WHERE id = ?4",
            params![name, phone_number, address, id],
        )?;
        if updated == 0 {
            return Err(AppError::NotFound("User not found.".into()));
        }

        drop(conn);
        self.find_by_id(id)?
            .ok_or_else(|| AppError::NotFound("User not found.".into()))
    }

    /// Attach a reset token with a fixed expiry window. Replaces any token
    /// already outstanding.
    pub fn store_reset_token(
        &self,
        id: &str,
        token: &str,
        expires_minutes: i64,
    ) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE accounts
             SET reset_token = ?1,
                 reset_token_expires_at = datetime('now', ?2 || ' minutes'),
                 updated_at = datetime('now')
             WHERE id = ?3",
            params![token, expires_minutes, id],
        )?;
        Ok(())
    }

    /// Look up an account by reset token, only while the expiry is strictly
    /// in the future.
    pub fn find_by_valid_reset_token(&self, token: &str) -> AppResult<Option<Account>> {
        let conn = self.pool.get()?;
        fetch_one(
            &conn,
            &format!(
                "SELECT {} FROM accounts
                 WHERE reset_token = ?1 AND reset_token_expires_at > datetime('now')",
                ACCOUNT_COLUMNS
            ),
            params![token],
        )
    }

    /// Install the new hash and burn the token in one statement, so a used
    /// token can never be replayed.
    pub fn apply_password_reset(&self, id: &str, password_hash: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE accounts
             SET password_hash = ?1,
                 reset_token = NULL,
                 reset_token_expires_at = NULL,
                 updated_at = datetime('now')
             WHERE id = ?2",
            params![password_hash, id],
        )?;
        Ok(())
    }
}

fn fetch_one(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> AppResult<Option<Account>> {
    let result = conn.query_row(sql, args, |row| map_account(row));
    match result {
        Ok(account) => Ok(Some(account)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    let role_str: String = row.get(4)?;
    let role = Role::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(4, "role".into(), rusqlite::types::Type::Text)
    })?;
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        phone_number: row.get(5)?,
        address: row.get(6)?,
        reset_token: row.get(7)?,
        reset_token_expires_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}
