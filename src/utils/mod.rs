pub mod errors;
pub mod period;

pub use errors::PipelineError;
pub use period::parse_period;
