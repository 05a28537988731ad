mod appointment_service;
mod conflict_checker;

pub use appointment_service::AppointmentService;
pub use conflict_checker::ConflictChecker;
