//! Content API for a static portfolio site whose content lives in a GitHub
//! repository.
//!
//! The admin panel exchanges an OAuth code for a token, then uses that token
//! to replace sections of the site's JSON document or to upload images. Each
//! write becomes one commit on the configured branch; nothing is stored here.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
