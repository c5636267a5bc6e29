//! Type definitions for the Replicate API

mod page;
mod params;
mod status;
mod views;

pub use page::Page;
pub use params::{CreatePredictionParams, CreateTrainingParams, ModelLookup, VersionSelector};
pub use status::Status;
pub use views::{ModelVersionView, ModelView, PredictionView, TrainingView, UploadView};
