use thiserror::Error;

/// Top-level pipeline errors. Every variant is fatal to the run: the error
/// propagates to `main`, gets logged, and the process exits non-zero without
/// writing a partial chart.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Currency conversion failed: {0}")]
    Conversion(String),
    #[error("Not enough data to plot: {0}")]
    DataGap(String),
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
