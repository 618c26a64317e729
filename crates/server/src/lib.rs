//! Web front end for the weather predictors
//!
//! Serves the prediction form, health checks and Prometheus metrics.

pub mod api;
pub mod config;
pub mod pages;
