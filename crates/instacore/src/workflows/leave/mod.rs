//! Leave-of-absence requests and their approval lifecycle.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{LeaveRequest, LeaveRequestId, LeaveStatus};
pub use repository::LeaveRepository;
pub use service::{LeaveService, LeaveServiceError};
