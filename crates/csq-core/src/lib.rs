#![deny(missing_docs)]
#![doc = "Core error, sample and metadata types shared by the csq central-spin toolkit."]

pub mod errors;
pub mod provenance;
mod types;

pub use errors::{CsqError, ErrorInfo};
pub use provenance::RunMetadata;
pub use types::{Xy, Xys};
