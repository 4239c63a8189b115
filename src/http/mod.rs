//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! email and asset handlers.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_304_response, build_asset_not_found_response, build_asset_response, json_response,
    ASSET_NOT_FOUND_BODY,
};
