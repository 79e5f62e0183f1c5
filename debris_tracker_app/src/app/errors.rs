use debris_tracker::{CaptureError, ConfigError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid detection settings: {0}")]
    Detection(#[from] ConfigError),

    #[error("Failed to open the frame source: {0}")]
    Capture(#[from] CaptureError),

    #[error("Failed to read commands or write to the terminal: {0}")]
    Terminal(#[from] std::io::Error),
}

pub fn print_error_and_quit(e: eyre::Report) -> ! {
    #[allow(clippy::print_stderr)]
    let () = eprintln!("{:?}", e);
    std::process::exit(1);
}
