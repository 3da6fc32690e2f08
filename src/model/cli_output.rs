use std::fmt::Display;

use clap::ValueEnum;
use serde::Serialize;

use super::{cli_error::CliError, exit_code::FailureExitCode};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// Print a per-file progress line. In JSON mode stdout carries only the
    /// summary object, so progress goes to stderr.
    pub fn progress(self, line: impl Display) {
        match self {
            OutputFormat::Text => println!("{}", line),
            OutputFormat::Json => eprintln!("{}", line),
        }
    }
}

pub struct CliResult<T: Serialize + Display> {
    inner: Result<T, CliError>,
}

impl<T: Serialize + Display> CliResult<T> {
    pub fn new(inner: Result<T, CliError>) -> Self {
        CliResult { inner }
    }

    pub fn print_or_exit(self, format: OutputFormat) {
        match self.inner {
            Ok(r) => match format {
                OutputFormat::Text => {
                    let text = r.to_string();
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
                OutputFormat::Json => match serde_json::to_string(&r) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("Failed to serialize output");
                        eprintln!("{}", e);
                        std::process::exit(FailureExitCode::SerializationFailed as i32);
                    }
                },
            },
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(FailureExitCode::for_error(&e) as i32);
            }
        }
    }
}
