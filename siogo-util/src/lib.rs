#![warn(clippy::all)]

#[macro_use]
extern crate strum;

pub mod config;
pub mod console;
pub mod error;
mod macros;
pub mod model;
pub mod retries;
pub mod service;

pub use config::SessionConfig;
pub use console::{Console, ConsoleConfig};
pub use error::{ErrorExt, ErrorKind, ScrapeError};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
