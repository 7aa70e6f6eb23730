pub mod domain;
pub mod repository;

pub use domain::{AdoptionStatus, CatalogError, NewPet, Pet, PetFilters, PetPatch, PetWithShelter};
pub use repository::PetRepository;
