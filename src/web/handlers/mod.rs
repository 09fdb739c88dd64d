//! Route handler modules for the pitchdesk REST API.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod proposals;
