pub mod domain;
pub mod repository;

pub use domain::{
    Application, ApplicationStatus, Decision, NewApplication, WorkflowError,
};
pub use repository::ApplicationRepository;
