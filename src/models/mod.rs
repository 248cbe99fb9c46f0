//! Core data models for the portfolio content service.
//!
//! The site document and its section schemas, uploaded images, and the JSON
//! bodies exchanged with the admin panel. All of them serialize naturally via
//! `serde`.

pub mod api;
pub mod document;
pub mod image;
pub mod sections;
