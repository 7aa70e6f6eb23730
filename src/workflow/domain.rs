// Domain types for the adoption application workflow - pure state transitions
use serde::{Deserialize, Serialize};

use crate::db::models::ShelterRef;
use crate::error::AppError;

/// Application status. Pending is the sole initial state; Approved and
/// Rejected are terminal. Withdrawn is reachable only by the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ApplicationStatus::Pending),
            "Approved" => Some(ApplicationStatus::Approved),
            "Rejected" => Some(ApplicationStatus::Rejected),
            "Withdrawn" => Some(ApplicationStatus::Withdrawn),
            _ => None,
        }
    }

    /// Transition: Pending → {Approved, Rejected}. Decided applications
    /// cannot be re-decided.
    pub fn decide(self, decision: Decision) -> Result<ApplicationStatus, WorkflowError> {
        match self {
            ApplicationStatus::Pending => Ok(decision.into()),
            other => Err(WorkflowError::AlreadyDecided {
                current: other.as_str(),
            }),
        }
    }

    /// Transition: Pending → Withdrawn, applicant-initiated.
    pub fn withdraw(self) -> Result<ApplicationStatus, WorkflowError> {
        match self {
            ApplicationStatus::Pending => Ok(ApplicationStatus::Withdrawn),
            other => Err(WorkflowError::AlreadyDecided {
                current: other.as_str(),
            }),
        }
    }
}

/// A shelter's verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

impl From<Decision> for ApplicationStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ApplicationStatus::Approved,
            Decision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WorkflowError {
    #[error("Application status is already \"{current}\". Cannot change.")]
    AlreadyDecided { current: &'static str },

    #[error("Pet \"{name}\" is not available for adoption.")]
    PetNotAvailable { name: String },

    #[error("You have already submitted an application for this pet.")]
    DuplicateApplication,
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        AppError::Conflict(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub applicant_id: String,
    pub pet_id: String,
    /// Decision authority, captured from the pet's owner at submission.
    pub shelter_id: String,
    pub status: ApplicationStatus,
    pub applicant_message: Option<String>,
    pub home_environment: Option<String>,
    pub shelter_notes: Option<String>,
    pub decided_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewApplication {
    pub pet_id: String,
    pub applicant_message: Option<String>,
    pub home_environment: Option<String>,
}

/// Minimal pet info attached to application listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSummary {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// Applicant info visible to the deciding shelter.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicantRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationForApplicant {
    #[serde(flatten)]
    pub application: Application,
    pub pet: PetSummary,
    pub shelter: ShelterRef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationForShelter {
    #[serde(flatten)]
    pub application: Application,
    pub pet: PetSummary,
    pub applicant: ApplicantRef,
}
