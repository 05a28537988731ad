//! Appointment categories (name + display color).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/categories` | List categories |
//! | POST | `/api/categories` | Create category |
//! | DELETE | `/api/categories/{id}` | Delete category (no cascade) |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
