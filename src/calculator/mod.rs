//! ROI calculator domain
//!
//! Submission schema, number formatting, and the email prompt built from them.

pub mod format;
pub mod prompt;
pub mod submission;

pub use format::format_currency;
pub use prompt::render_prompt;
pub use submission::{CalculatorSubmission, ValidationErrors};
