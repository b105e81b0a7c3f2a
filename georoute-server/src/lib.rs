//! Geocoding and routing server.
//!
//! Resolves free-form addresses to coordinates and calculates driving
//! routes, falling back across several external providers and caching
//! results for a configurable time.

pub mod cache;
pub mod credentials;
pub mod domain;
pub mod providers;
pub mod resolver;
pub mod supervisor;
pub mod web;
