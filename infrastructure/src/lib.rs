//! Infrastructure layer for selfcheck
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod documents;
pub mod logging;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FileOutputConfig,
    FileOutputFormat, FileStorageConfig, FileSurveyConfig,
};
pub use documents::{DocumentStoreMirror, MapperError, RunDocV1, SurveyDocV1};
pub use logging::JsonlActivityLogger;
pub use storage::{
    InMemoryRunRepository, InMemorySurveyRepository, JsonFileStore, LocalRunRepository,
    LocalSurveyRepository,
};
