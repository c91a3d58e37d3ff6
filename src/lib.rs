pub mod changelog;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod identity;
pub mod output;
pub mod pipeline;
pub mod promote;
pub mod publish;
pub mod tagging;
pub mod ui;
pub mod version;

pub use error::{ReleaseError, Result};
