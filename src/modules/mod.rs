//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the persistence and email collaborators the features depend on.

pub mod email;
pub mod storage;
