//! Appointment reminders.
//!
//! [`NotificationScheduler`] runs in the background for the lifetime of the
//! server. The only endpoint sends a reminder on demand.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/test-notification` | Send a reminder email immediately |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod workers;

pub use workers::NotificationScheduler;
