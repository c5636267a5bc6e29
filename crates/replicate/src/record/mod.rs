//! Records returned by the API
//!
//! Every resource comes back as a [`Record`]: an immutable JSON document with
//! a weak handle to the client that fetched it. The typed variants
//! ([`Prediction`], [`Training`], [`Model`], [`ModelVersion`], [`Upload`])
//! add the follow-up operations each kind supports.

mod base;
mod mixins;
mod model;
mod model_version;
mod prediction;
mod training;
mod upload;

pub use base::{AsRecord, Record};
pub use mixins::{Refreshable, Statusable};
pub use model::Model;
pub use model_version::ModelVersion;
pub use prediction::Prediction;
pub use training::Training;
pub use upload::Upload;
