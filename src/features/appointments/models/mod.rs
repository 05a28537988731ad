mod appointment;

pub use appointment::{Appointment, AppointmentChanges, CandidateInterval, NewAppointment};
