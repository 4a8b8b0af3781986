#![warn(clippy::all)]

mod client;
pub mod extract;
mod page;
pub mod profile;
pub mod profiles;
pub mod registry;

use siogo_util::{console, model, service};

pub use siogo_util::{ErrorKind, ScrapeError, SessionConfig};

use crate::console::Console;

pub use client::Sio2Client;
pub use profile::Profile;
pub use registry::{Driver, Registry};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;
