// Repository for adoption applications. Multi-step mutations run inside a
// single transaction; notification context is returned to the caller so the
// email stays outside the transaction boundary.
use rusqlite::{params, Connection, Row};

use crate::catalog::domain::AdoptionStatus;
use crate::db::models::ShelterRef;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;
use crate::workflow::domain::{
    ApplicantRef, Application, ApplicationForApplicant, ApplicationForShelter, ApplicationStatus,
    Decision, NewApplication, PetSummary, WorkflowError,
};

const APP_COLUMNS: &str = "id, applicant_id, pet_id, shelter_id, status, applicant_message, \
     home_environment, shelter_notes, decided_at, created_at";

/// A submitted application plus what the notifier needs to tell the shelter.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub application: Application,
    pub pet_name: String,
    pub shelter_email: String,
}

/// A decided application plus what the notifier needs to tell the applicant.
#[derive(Debug)]
pub struct DecisionOutcome {
    pub application: Application,
    pub pet_name: String,
    pub applicant_name: String,
    pub applicant_email: String,
}

pub struct ApplicationRepository {
    pool: DbPool,
}

impl ApplicationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Submit an application for an Available pet. The pet's current owner is
    /// captured as the immutable decision authority.
    pub fn submit(&self, applicant_id: &str, new_app: &NewApplication) -> AppResult<SubmitOutcome> {
        if new_app.pet_id.trim().is_empty() {
            return Err(AppError::Validation("Pet ID is required.".into()));
        }

        let conn = self.pool.get()?;
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: AppResult<SubmitOutcome> = (|| {
            let pet = conn.query_row(
                "SELECT p.name, p.owner_id, p.adoption_status, a.email
                 FROM pets p JOIN accounts a ON a.id = p.owner_id
                 WHERE p.id = ?1",
                params![new_app.pet_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            );
            let (pet_name, shelter_id, status_str, shelter_email) = match pet {
                Ok(v) => v,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(AppError::NotFound("Pet not found.".into()))
                }
                Err(e) => return Err(e.into()),
            };

            let pet_status = AdoptionStatus::parse(&status_str)
                .ok_or_else(|| AppError::Internal(format!("Bad pet status: {}", status_str)))?;
            if pet_status != AdoptionStatus::Available {
                return Err(WorkflowError::PetNotAvailable { name: pet_name }.into());
            }

            let already_applied: bool = conn.query_row(
                "SELECT COUNT(*) > 0 FROM applications
                 WHERE applicant_id = ?1 AND pet_id = ?2 AND status != 'Withdrawn'",
                params![applicant_id, new_app.pet_id],
                |row| row.get(0),
            )?;
            if already_applied {
                return Err(WorkflowError::DuplicateApplication.into());
            }

            let id = uuid::Uuid::now_v7().to_string();
            conn.execute(
                "INSERT INTO applications
                     (id, applicant_id, pet_id, shelter_id, applicant_message, home_environment)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    applicant_id,
                    new_app.pet_id,
                    shelter_id,
                    new_app.applicant_message,
                    new_app.home_environment,
                ],
            )?;

            let application = fetch(&conn, &id)?
                .ok_or_else(|| AppError::Internal("Created application not found".into()))?;

            Ok(SubmitOutcome {
                application,
                pet_name,
                shelter_email,
            })
        })();

        finish(&conn, result)
    }

    /// Decide a pending application. Ownership is part of the lookup
    /// predicate: a foreign application id looks exactly like a missing one.
    /// On approval the pet is reserved (Available → Pending) in the same
    /// transaction; a rejection never touches the pet.
    pub fn decide(
        &self,
        application_id: &str,
        shelter_id: &str,
        decision: Decision,
        notes: Option<&str>,
    ) -> AppResult<DecisionOutcome> {
        let conn = self.pool.get()?;
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: AppResult<DecisionOutcome> = (|| {
            let row = conn.query_row(
                "SELECT app.status, app.pet_id, u.name, u.email, p.name
                 FROM applications app
                 JOIN accounts u ON u.id = app.applicant_id
                 JOIN pets p ON p.id = app.pet_id
                 WHERE app.id = ?1 AND app.shelter_id = ?2",
                params![application_id, shelter_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            );
            let (status_str, pet_id, applicant_name, applicant_email, pet_name) = match row {
                Ok(v) => v,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(AppError::NotFound(
                        "Application not found or you do not have permission to modify it.".into(),
                    ))
                }
                Err(e) => return Err(e.into()),
            };

            let current = ApplicationStatus::parse(&status_str)
                .ok_or_else(|| AppError::Internal(format!("Bad application status: {}", status_str)))?;
            let next = current.decide(decision)?;

            // Compare-and-set on status serializes racing decisions: the
            // loser updates zero rows.
            let updated = conn.execute(
                "UPDATE applications
                 SET status = ?1,
                     shelter_notes = COALESCE(?2, shelter_notes),
                     decided_at = datetime('now'),
                     updated_at = datetime('now')
                 WHERE id = ?3 AND status = 'Pending'",
                params![next.as_str(), notes, application_id],
            )?;
            if updated == 0 {
                return Err(WorkflowError::AlreadyDecided {
                    current: current.as_str(),
                }
                .into());
            }

            if next == ApplicationStatus::Approved {
                let reserved = conn.execute(
                    "UPDATE pets SET adoption_status = 'Pending', updated_at = datetime('now')
                     WHERE id = ?1 AND adoption_status = 'Available'",
                    params![pet_id],
                )?;
                if reserved > 0 {
                    tracing::info!(
                        "Pet {} reserved (status Pending) due to application approval",
                        pet_id
                    );
                }
            }

            let application = fetch(&conn, application_id)?
                .ok_or_else(|| AppError::Internal("Decided application not found".into()))?;

            Ok(DecisionOutcome {
                application,
                pet_name,
                applicant_name,
                applicant_email,
            })
        })();

        finish(&conn, result)
    }

    /// Applicant-initiated withdrawal of a pending application. Frees the
    /// (applicant, pet) pair for a later resubmission.
    pub fn withdraw(&self, application_id: &str, applicant_id: &str) -> AppResult<Application> {
        let conn = self.pool.get()?;
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result: AppResult<Application> = (|| {
            let status_row = conn.query_row(
                "SELECT status FROM applications WHERE id = ?1 AND applicant_id = ?2",
                params![application_id, applicant_id],
                |row| row.get::<_, String>(0),
            );
            let status_str = match status_row {
                Ok(v) => v,
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    return Err(AppError::NotFound("Application not found.".into()))
                }
                Err(e) => return Err(e.into()),
            };

            let current = ApplicationStatus::parse(&status_str)
                .ok_or_else(|| AppError::Internal(format!("Bad application status: {}", status_str)))?;
            let next = current.withdraw()?;

            let updated = conn.execute(
                "UPDATE applications
                 SET status = ?1, decided_at = datetime('now'), updated_at = datetime('now')
                 WHERE id = ?2 AND status = 'Pending'",
                params![next.as_str(), application_id],
            )?;
            if updated == 0 {
                return Err(WorkflowError::AlreadyDecided {
                    current: current.as_str(),
                }
                .into());
            }

            fetch(&conn, application_id)?
                .ok_or_else(|| AppError::Internal("Withdrawn application not found".into()))
        })();

        finish(&conn, result)
    }

    /// The applicant's own applications, newest first.
    pub fn list_for_applicant(
        &self,
        applicant_id: &str,
    ) -> AppResult<Vec<ApplicationForApplicant>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, p.id, p.name, p.image_url, s.id, s.name
             FROM applications app
             JOIN pets p ON p.id = app.pet_id
             JOIN accounts s ON s.id = app.shelter_id
             WHERE app.applicant_id = ?1
             ORDER BY app.created_at DESC, app.id DESC",
            prefixed_columns("app")
        ))?;
        let rows = stmt.query_map(params![applicant_id], |row| {
            Ok(ApplicationForApplicant {
                application: map_application(row)?,
                pet: PetSummary {
                    id: row.get(10)?,
                    name: row.get(11)?,
                    image_url: row.get(12)?,
                },
                shelter: ShelterRef {
                    id: row.get(13)?,
                    name: row.get(14)?,
                },
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Applications awaiting (or past) this shelter's decision, newest first.
    pub fn list_for_shelter(&self, shelter_id: &str) -> AppResult<Vec<ApplicationForShelter>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {}, p.id, p.name, p.image_url, u.id, u.name, u.email
             FROM applications app
             JOIN pets p ON p.id = app.pet_id
             JOIN accounts u ON u.id = app.applicant_id
             WHERE app.shelter_id = ?1
             ORDER BY app.created_at DESC, app.id DESC",
            prefixed_columns("app")
        ))?;
        let rows = stmt.query_map(params![shelter_id], |row| {
            Ok(ApplicationForShelter {
                application: map_application(row)?,
                pet: PetSummary {
                    id: row.get(10)?,
                    name: row.get(11)?,
                    image_url: row.get(12)?,
                },
                applicant: ApplicantRef {
                    id: row.get(13)?,
                    name: row.get(14)?,
                    email: row.get(15)?,
                },
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn finish<T>(conn: &Connection, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(e)
        }
    }
}

fn prefixed_columns(alias: &str) -> String {
    APP_COLUMNS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fetch(conn: &Connection, id: &str) -> AppResult<Option<Application>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM applications WHERE id = ?1", APP_COLUMNS),
        params![id],
        |row| map_application(row),
    );
    match result {
        Ok(application) => Ok(Some(application)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn map_application(row: &Row<'_>) -> rusqlite::Result<Application> {
    let status_str: String = row.get(4)?;
    let status = ApplicationStatus::parse(&status_str).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(4, "status".into(), rusqlite::types::Type::Text)
    })?;
    Ok(Application {
        id: row.get(0)?,
        applicant_id: row.get(1)?,
        pet_id: row.get(2)?,
        shelter_id: row.get(3)?,
        status,
        applicant_message: row.get(5)?,
        home_environment: row.get(6)?,
        shelter_notes: row.get(7)?,
        decided_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}
