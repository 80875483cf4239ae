pub mod compressor;
pub mod error;
pub mod executor;
pub mod prompt_builder;
pub mod response_parser;
pub mod visit_scheduler;

pub use error::TourPlanError;
pub use executor::TourPlanExecutor;
