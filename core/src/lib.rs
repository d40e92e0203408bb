pub mod calc;
pub mod error;
pub mod feed;
pub mod model;
pub mod repository;
pub mod service;

pub use calc::{concentrations, DoseAmounts};
pub use error::CoreError;
pub use feed::{FeedSnapshot, FeedState, FeedStatus, SensorReading};
pub use model::entry::{DoseEntry, NewDoseEntry};
pub use model::formulation::{Element, Formulation, Product};
pub use repository::{DoseEntryRepository, FileDoseEntryRepository};
pub use service::dose_service::DoseService;
