pub mod appointments;
pub mod categories;
pub mod notifications;
