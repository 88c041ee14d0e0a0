//! Weather-and-clothing log with a classifier trained on it.
//!
//! The collector fetches an hour of weather from Open-Meteo, asks what was
//! worn, and appends one row to a SQLite table. The trainer flattens those
//! rows into feature and target columns and fits a multi-output random
//! forest.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod forest;
pub mod formatters;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod record;
pub mod service;
pub mod store;
pub mod training;
pub mod vocab;

pub use config::{Config, ServiceConfig};
pub use error::{FetchError, StoreError, TrainError, ValidationError};
pub use models::{Coordinates, WeatherReading};
pub use record::{Hour, LogRow, RawRow};
pub use service::WeatherService;
pub use store::Store;
pub use training::{train, TrainOptions, TrainingOutcome};
pub use vocab::{ActivitySelection, ClothingSelection, Selection, SportsSuitability};
