// Per-account favorite pets. Keyed by (account, pet); listing returns the
// full pet rows so the frontend can render cards straight from it.
use rusqlite::params;

use crate::catalog::repository::{map_pet, prefixed_columns};
use crate::catalog::PetWithShelter;
use crate::db::models::ShelterRef;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub struct FavoriteRepository {
    pool: DbPool,
}

impl FavoriteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Mark a pet as a favorite. A duplicate save is a Conflict, not a
    /// silent no-op.
    pub fn add(&self, account_id: &str, pet_id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;

        let pet_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM pets WHERE id = ?1",
            params![pet_id],
            |row| row.get(0),
        )?;
        if !pet_exists {
            return Err(AppError::NotFound("Pet not found.".into()));
        }

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO favorites (account_id, pet_id) VALUES (?1, ?2)",
            params![account_id, pet_id],
        )?;
        if inserted == 0 {
            return Err(AppError::Conflict("Pet already in favorites.".into()));
        }
        Ok(())
    }

    /// Remove a favorite. Missing rows surface as not found rather than a
    /// silent no-op.
    pub fn remove(&self, account_id: &str, pet_id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM favorites WHERE account_id = ?1 AND pet_id = ?2",
            params![account_id, pet_id],
        )?;
        if removed == 0 {
            return Err(AppError::NotFound("Pet not found in favorites.".into()));
        }
        Ok(())
    }

    /// The account's favorited pets, most recently saved first.
    pub fn list(&self, account_id: &str) -> AppResult<Vec<PetWithShelter>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, a.id, a.name
             FROM favorites f
             JOIN pets p ON p.id = f.pet_id
             JOIN accounts a ON a.id = p.owner_id
             WHERE f.account_id = ?1
             ORDER BY f.created_at DESC, p.id DESC",
            prefixed_columns("p")
        ))?;
        let rows = stmt.query_map(params![account_id], |row| {
            Ok(PetWithShelter {
                pet: map_pet(row)?,
                shelter: ShelterRef {
                    id: row.get(14)?,
                    name: row.get(15)?,
                },
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
