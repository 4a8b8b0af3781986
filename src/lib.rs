#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::io;
use std::time::Duration;

use anyhow::anyhow;
use siogo_sio2::{registry, Driver};
use siogo_util::service::Act;
use siogo_util::SessionConfig;
use structopt::StructOpt;
use strum::VariantNames;
use tracing::debug;

mod cmd;

use cmd::{Cmd, Run as _};

pub use siogo_util::{Console, ConsoleConfig};

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(
    EnumString, EnumVariantNames, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(about = "Simple text-based SIO2 client.", rename_all = "kebab")]
pub struct Opt {
    #[structopt(flatten)]
    global_opt: GlobalOpt,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct GlobalOpt {
    /// Address of the portal, or one of the abbreviations listed by `hosts`
    #[structopt(
        long,
        short = "H",
        global = true,
        env = "SIOGO_HOST",
        default_value = "staszic"
    )]
    host: String,
    #[structopt(
        long,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    format: OutputFormat,
    /// Skips confirmations
    #[structopt(long, short = "y", global = true)]
    assume_yes: bool,
    /// Attempts made before giving up on a page that is not ready
    #[structopt(long, global = true, default_value = "4")]
    retry_limit: usize,
    #[structopt(
        long,
        global = true,
        default_value = "2s",
        parse(try_from_str = humantime::parse_duration)
    )]
    retry_interval: Duration,
    #[structopt(
        long,
        global = true,
        default_value = "30s",
        parse(try_from_str = humantime::parse_duration)
    )]
    timeout: Duration,
}

impl GlobalOpt {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.timeout, self.retry_limit, self.retry_interval)
    }

    pub fn console_config(&self) -> ConsoleConfig {
        ConsoleConfig {
            assume_yes: self.assume_yes,
        }
    }

    pub fn driver(&self) -> Result<&'static Driver> {
        registry::resolve(&self.host)
    }

    /// Connects to the selected portal. Request progress goes to `cnsl`.
    pub fn connect(&self, cnsl: &Console) -> Result<(&'static Driver, Box<dyn Act>)> {
        let driver = self.driver()?;
        debug!(host = driver.profile().host().as_str(), "connecting");
        let act = driver.open(&self.session_config(), cnsl.clone())?;
        Ok((driver, act))
    }
}

impl Opt {
    pub fn console_config(&self) -> ConsoleConfig {
        self.global_opt.console_config()
    }

    pub fn run(&self, stdout: &mut dyn io::Write, cnsl: &mut Console) -> Result<()> {
        let outcome = self.cmd.run(&self.global_opt, cnsl)?;
        outcome.print(stdout, self.global_opt.format)?;
        if outcome.is_error() {
            Err(anyhow!("Command finished with an error outcome"))
        } else {
            Ok(())
        }
    }
}
