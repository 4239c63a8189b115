//! Request handler module
//!
//! Responsible for request routing dispatch and the two request handlers:
//! the email-preparation endpoint and the static asset resolver.

pub mod email;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
