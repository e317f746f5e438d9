pub mod config;
pub mod detector;
pub mod models;
pub mod parsers;
pub mod run;
pub mod source;
pub mod storage;
pub mod telegram;
pub mod utils;

pub use crate::config::Config;
pub use crate::detector::{Detector, Evaluation, MatchMode, NotifyPolicy, StatePersistence};
pub use crate::run::{run_once, RunError, RunSummary};
