//! Appointments on the weekly calendar.
//!
//! Every create and every update that moves an appointment in time goes
//! through [`ConflictChecker`] first; overlapping writes are rejected with 409.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/appointments` | List appointments (optional `startDate`/`endDate`) |
//! | POST | `/api/appointments` | Create appointment |
//! | PUT | `/api/appointments/{id}` | Partially update appointment |
//! | DELETE | `/api/appointments/{id}` | Delete appointment |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{AppointmentService, ConflictChecker};
