//! ROI email edge service
//!
//! Serves the calculator's single-page application bundle and turns ROI
//! calculator submissions into draft emails through a text-generation API.

pub mod assets;
pub mod background;
pub mod calculator;
pub mod config;
pub mod generation;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
