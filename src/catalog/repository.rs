// Repository for pet listings - isolates all catalog database access
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::catalog::domain::{AdoptionStatus, NewPet, Pet, PetFilters, PetPatch, PetWithShelter};
use crate::db::models::ShelterRef;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub(crate) const PET_COLUMNS: &str = "id, owner_id, name, species, breed, age, gender, size, \
     description, medical_history, adoption_status, image_url, location, created_at";

pub struct PetRepository {
    pool: DbPool,
}

impl PetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a listing owned by `owner_id`. Status defaults to Available
    /// unless overridden at creation time.
    pub fn create(&self, owner_id: &str, new_pet: &NewPet) -> AppResult<Pet> {
        new_pet.validate()?;

        let conn = self.pool.get()?;
        let id = uuid::Uuid::now_v7().to_string();
        let status = new_pet.adoption_status.unwrap_or(AdoptionStatus::Available);

        conn.execute(
            "INSERT INTO pets (id, owner_id, name, species, breed, age, gender, size,
                               description, medical_history, adoption_status, image_url, location)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                id,
                owner_id,
                new_pet.name.trim(),
                new_pet.species.trim(),
                new_pet.breed,
                new_pet.age,
                new_pet.gender,
                new_pet.size,
                new_pet.description,
                new_pet.medical_history,
                status.as_str(),
                new_pet.image_url,
                new_pet.location,
            ],
        )?;

        self.fetch(&conn, &id)?
            .ok_or_else(|| AppError::Internal("Created pet not found".into()))
    }

    /// Public browse view: everything not yet Adopted, optionally filtered,
    /// newest first, with the owning shelter's public identity attached.
    pub fn list_public(&self, filters: &PetFilters) -> AppResult<Vec<PetWithShelter>> {
        let conn = self.pool.get()?;

        let mut sql = format!(
            "SELECT {}, a.id, a.name
             FROM pets p JOIN accounts a ON a.id = p.owner_id
             WHERE p.adoption_status != 'Adopted'",
            prefixed_columns("p")
        );
        let mut args: Vec<String> = Vec::new();

        for (column, value) in [
            ("p.species", filters.species_filter()),
            ("p.age", filters.age_filter()),
            ("p.size", filters.size_filter()),
            ("p.location", filters.location_filter()),
        ] {
            if let Some(value) = value {
                args.push(value);
                sql.push_str(&format!(" AND {} = ?{}", column, args.len()));
            }
        }
        sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
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

    /// All listings owned by one shelter, newest first, including Adopted.
    pub fn list_for_shelter(&self, owner_id: &str) -> AppResult<Vec<Pet>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pets WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC",
            PET_COLUMNS
        ))?;
        let rows = stmt.query_map(params![owner_id], |row| map_pet(row))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn get(&self, id: &str) -> AppResult<PetWithShelter> {
        let conn = self.pool.get()?;
        let result = conn.query_row(
            &format!(
                "SELECT {}, a.id, a.name
                 FROM pets p JOIN accounts a ON a.id = p.owner_id
                 WHERE p.id = ?1",
                prefixed_columns("p")
            ),
            params![id],
            |row| {
                Ok(PetWithShelter {
                    pet: map_pet(row)?,
                    shelter: ShelterRef {
                        id: row.get(14)?,
                        name: row.get(15)?,
                    },
                })
            },
        );

        match result {
            Ok(pet) => Ok(pet),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(AppError::NotFound("Pet not found.".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a patch to a listing. Only the owning shelter may update, and
    /// the owner column itself is never patchable. A status change must be a
    /// valid transition from the current status.
    pub fn update(&self, id: &str, requester_id: &str, patch: &PetPatch) -> AppResult<Pet> {
        let conn = self.pool.get()?;

        let pet = self
            .fetch(&conn, id)?
            .ok_or_else(|| AppError::NotFound("Pet not found.".into()))?;

        if pet.owner_id != requester_id {
            tracing::warn!(
                "Shelter {} attempted to update pet {} owned by {}",
                requester_id,
                id,
                pet.owner_id
            );
            return Err(AppError::Forbidden(
                "Access denied. You can only update your own pet listings.".into(),
            ));
        }

        if let Some(next) = patch.adoption_status {
            if !pet.adoption_status.can_transition_to(next) {
                return Err(crate::catalog::domain::CatalogError::InvalidStatusChange {
                    from: pet.adoption_status.as_str(),
                    to: next.as_str(),
                }
                .into());
            }
        }

        let mut sets: Vec<String> = Vec::new();
        let mut args: Vec<String> = Vec::new();
        let status_str = patch.adoption_status.map(|s| s.as_str().to_string());

        for (column, value) in [
            ("name", &patch.name),
            ("species", &patch.species),
            ("breed", &patch.breed),
            ("age", &patch.age),
            ("gender", &patch.gender),
            ("size", &patch.size),
            ("description", &patch.description),
            ("medical_history", &patch.medical_history),
            ("adoption_status", &status_str),
            ("image_url", &patch.image_url),
            ("location", &patch.location),
        ] {
            if let Some(value) = value {
                args.push(value.clone());
                sets.push(format!("{} = ?{}", column, args.len()));
            }
        }

        if !sets.is_empty() {
            args.push(id.to_string());
            let sql = format!(
                "UPDATE pets SET {}, updated_at = datetime('now') WHERE id = ?{}",
                sets.join(", "),
                args.len()
            );
            conn.execute(&sql, params_from_iter(args.iter()))?;
        }

        self.fetch(&conn, id)?
            .ok_or_else(|| AppError::NotFound("Pet not found.".into()))
    }

    /// Remove a listing. Same ownership guard as update.
    pub fn delete(&self, id: &str, requester_id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;

        let pet = self
            .fetch(&conn, id)?
            .ok_or_else(|| AppError::NotFound("Pet not found.".into()))?;

        if pet.owner_id != requester_id {
            tracing::warn!(
                "Shelter {} attempted to delete pet {} owned by {}",
                requester_id,
                id,
                pet.owner_id
            );
            return Err(AppError::Forbidden(
                "Access denied. You can only delete your own pet listings.".into(),
            ));
        }

        conn.execute("DELETE FROM pets WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn fetch(&self, conn: &Connection, id: &str) -> AppResult<Option<Pet>> {
        let result = conn.query_row(
            &format!("SELECT {} FROM pets WHERE id = ?1", PET_COLUMNS),
            params![id],
            |row| map_pet(row),
        );
        match result {
            Ok(pet) => Ok(Some(pet)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn prefixed_columns(alias: &str) -> String {
    PET_COLUMNS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn map_pet(row: &Row<'_>) -> rusqlite::Result<Pet> {
    let status_str: String = row.get(10)?;
    let adoption_status = AdoptionStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(10, "adoption_status".into(), rusqlite::types::Type::Text)
    })?;
    Ok(Pet {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        species: row.get(3)?,
        breed: row.get(4)?,
        age: row.get(5)?,
        gender: row.get(6)?,
        size: row.get(7)?,
        description: row.get(8)?,
        medical_history: row.get(9)?,
        adoption_status,
        image_url: row.get(11)?,
        location: row.get(12)?,
        created_at: row.get(13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use r2d2_sqlite::SqliteConnectionManager;

    fn test_pool() -> DbPool {
        let manager = SqliteConnectionManager::memory();
        let pool = r2d2::Pool::builder().max_size(1).build(manager).unwrap();
        pool.get()
            .unwrap()
            .execute_batch("PRAGMA foreign_keys = ON;")
            .unwrap();
        db::run_migrations(&pool).unwrap();
        pool
    }

    fn seed_shelter(pool: &DbPool, id: &str, name: &str) {
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO accounts (id, name, email, password_hash, role)
                 VALUES (?1, ?2, ?3, 'hash', 'Shelter')",
                params![id, name, format!("{}@example.com", id)],
            )
            .unwrap();
    }

    fn dog(name: &str) -> NewPet {
        NewPet {
            name: name.into(),
            species: "Dog".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_defaults_to_available() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        let pet = repo.create("s1", &dog("Buddy")).unwrap();
        assert_eq!(pet.name, "Buddy");
        assert_eq!(pet.owner_id, "s1");
        assert_eq!(pet.adoption_status, AdoptionStatus::Available);
    }

    #[test]
    fn create_rejects_missing_species() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        let result = repo.create(
            "s1",
            &NewPet {
                name: "Buddy".into(),
                species: "  ".into(),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn public_listing_excludes_adopted() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        repo.create("s1", &dog("Buddy")).unwrap();
        repo.create(
            "s1",
            &NewPet {
                adoption_status: Some(AdoptionStatus::Adopted),
                ..dog("Max")
            },
        )
        .unwrap();

        let listed = repo.list_public(&PetFilters::default()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pet.name, "Buddy");
        assert_eq!(listed[0].shelter.name, "Happy Paws");
    }

    #[test]
    fn public_listing_applies_exact_filters() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        repo.create(
            "s1",
            &NewPet {
                size: Some("Large".into()),
                location: Some("Springfield".into()),
                ..dog("Buddy")
            },
        )
        .unwrap();
        repo.create(
            "s1",
            &NewPet {
                name: "Whiskers".into(),
                species: "Cat".into(),
                size: Some("Small".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let filters = PetFilters {
            species: Some("Dog".into()),
            ..Default::default()
        };
        let dogs = repo.list_public(&filters).unwrap();
        assert_eq!(dogs.len(), 1);
        assert_eq!(dogs[0].pet.name, "Buddy");

        let filters = PetFilters {
            species: Some("Any".into()),
            location: Some(" Springfield ".into()),
            ..Default::default()
        };
        let local = repo.list_public(&filters).unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].pet.name, "Buddy");
    }

    #[test]
    fn get_missing_pet_is_not_found() {
        let pool = test_pool();
        let repo = PetRepository::new(pool);
        assert!(matches!(repo.get("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn update_enforces_ownership() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        seed_shelter(&pool, "s2", "Other Shelter");
        let repo = PetRepository::new(pool);

        let pet = repo.create("s1", &dog("Buddy")).unwrap();

        let patch = PetPatch {
            name: Some("Stolen".into()),
            ..Default::default()
        };
        let result = repo.update(&pet.id, "s2", &patch);
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        // Fields unchanged afterwards
        let unchanged = repo.get(&pet.id).unwrap();
        assert_eq!(unchanged.pet.name, "Buddy");
    }

    #[test]
    fn owner_updates_fields() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        let pet = repo.create("s1", &dog("Buddy")).unwrap();
        let patch = PetPatch {
            breed: Some("Labrador".into()),
            description: Some("Friendly and calm".into()),
            ..Default::default()
        };
        let updated = repo.update(&pet.id, "s1", &patch).unwrap();
        assert_eq!(updated.breed.as_deref(), Some("Labrador"));
        assert_eq!(updated.name, "Buddy");
    }

    #[test]
    fn status_cannot_jump_available_to_adopted() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        let pet = repo.create("s1", &dog("Buddy")).unwrap();
        let patch = PetPatch {
            adoption_status: Some(AdoptionStatus::Adopted),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(&pet.id, "s1", &patch),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn pending_pet_can_be_released() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        let repo = PetRepository::new(pool);

        let pet = repo
            .create(
                "s1",
                &NewPet {
                    adoption_status: Some(AdoptionStatus::Pending),
                    ..dog("Buddy")
                },
            )
            .unwrap();
        let patch = PetPatch {
            adoption_status: Some(AdoptionStatus::Available),
            ..Default::default()
        };
        let released = repo.update(&pet.id, "s1", &patch).unwrap();
        assert_eq!(released.adoption_status, AdoptionStatus::Available);
    }

    #[test]
    fn delete_enforces_ownership() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        seed_shelter(&pool, "s2", "Other Shelter");
        let repo = PetRepository::new(pool);

        let pet = repo.create("s1", &dog("Buddy")).unwrap();
        assert!(matches!(
            repo.delete(&pet.id, "s2"),
            Err(AppError::Forbidden(_))
        ));

        repo.delete(&pet.id, "s1").unwrap();
        assert!(matches!(repo.get(&pet.id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn list_for_shelter_returns_own_pets_only() {
        let pool = test_pool();
        seed_shelter(&pool, "s1", "Happy Paws");
        seed_shelter(&pool, "s2", "Other Shelter");
        let repo = PetRepository::new(pool);

        repo.create("s1", &dog("Buddy")).unwrap();
        repo.create("s2", &dog("Max")).unwrap();

        let mine = repo.list_for_shelter("s1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Buddy");
    }
}
