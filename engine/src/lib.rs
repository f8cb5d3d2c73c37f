// Engine library root
//
// `indicators` and `engine` are pure numeric code; `data` adapts market-data
// providers onto the shared models; `services` turns chat commands into
// indicator reports.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod services;

pub use engine::{IndicatorConfig, IndicatorEngine, IndicatorReport, LatestSnapshot};
pub use error::EngineError;
