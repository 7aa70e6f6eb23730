// Domain types for the pet catalog - pure, no database access
use serde::{Deserialize, Serialize};

use crate::db::models::ShelterRef;
use crate::error::AppError;

/// Listing status. Available → Pending → Adopted, with an explicit release
/// path Pending → Available. Adopted is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdoptionStatus {
    Available,
    Pending,
    Adopted,
}

impl AdoptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdoptionStatus::Available => "Available",
            AdoptionStatus::Pending => "Pending",
            AdoptionStatus::Adopted => "Adopted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(AdoptionStatus::Available),
            "Pending" => Some(AdoptionStatus::Pending),
            "Adopted" => Some(AdoptionStatus::Adopted),
            _ => None,
        }
    }

    /// Whether a listing may move from `self` to `next`. Staying put is
    /// always allowed so that a full-row patch does not trip the guard.
    pub fn can_transition_to(self, next: AdoptionStatus) -> bool {
        use AdoptionStatus::*;
        self == next
            || matches!(
                (self, next),
                (Available, Pending) | (Pending, Available) | (Pending, Adopted)
            )
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogError {
    #[error("Pet name and species are required.")]
    MissingRequiredFields,

    #[error("Cannot change adoption status from {from} to {to}.")]
    InvalidStatusChange {
        from: &'static str,
        to: &'static str,
    },
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::MissingRequiredFields => AppError::Validation(err.to_string()),
            CatalogError::InvalidStatusChange { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: String,
    /// The owning shelter account. Immutable after creation.
    pub owner_id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub medical_history: Option<String>,
    pub adoption_status: AdoptionStatus,
    pub image_url: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
}

/// A listing together with its owning shelter's public identity.
#[derive(Debug, Clone, Serialize)]
pub struct PetWithShelter {
    #[serde(flatten)]
    pub pet: Pet,
    pub shelter: ShelterRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub medical_history: Option<String>,
    pub adoption_status: Option<AdoptionStatus>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

impl NewPet {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() || self.species.trim().is_empty() {
            return Err(CatalogError::MissingRequiredFields);
        }
        Ok(())
    }
}

/// Partial update. The owner foreign key is deliberately not representable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub medical_history: Option<String>,
    pub adoption_status: Option<AdoptionStatus>,
    pub image_url: Option<String>,
    pub location: Option<String>,
}

/// Public browse filters. "Any" and blank values mean no filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetFilters {
    pub species: Option<String>,
    pub age: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
}

impl PetFilters {
    fn normalize(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && *v != "Any")
            .map(str::to_string)
    }

    pub fn species_filter(&self) -> Option<String> {
        Self::normalize(&self.species)
    }

    pub fn age_filter(&self) -> Option<String> {
        Self::normalize(&self.age)
    }

    pub fn size_filter(&self) -> Option<String> {
        Self::normalize(&self.size)
    }

    pub fn location_filter(&self) -> Option<String> {
        Self::normalize(&self.location)
    }
}
