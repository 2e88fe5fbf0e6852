//! Subway station registry server.
//!
//! A small REST service for creating, listing and deleting subway
//! stations.

pub mod config;
pub mod domain;
pub mod registry;
pub mod telemetry;
pub mod web;
