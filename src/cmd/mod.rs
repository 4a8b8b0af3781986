use std::{fmt, io};

use anyhow::Context as _;
use serde::Serialize;
use siogo_util::service::Act;
use structopt::StructOpt;

use crate::{Console, GlobalOpt, OutputFormat, Result};

mod contests;
mod hosts;
mod problems;
mod statement;
mod submit;

pub use contests::{ContestsOpt, ContestsOutcome};
pub use hosts::{HostsOpt, HostsOutcome};
pub use problems::{ProblemsOpt, ProblemsOutcome};
pub use statement::{StatementOpt, StatementOutcome};
pub use submit::{SubmitOpt, SubmitOutcome};

static USERNAME_ENV: &str = "SIOGO_USERNAME";
static PASSWORD_ENV: &str = "SIOGO_PASSWORD";

pub trait Outcome: OutcomeSerialize {
    fn is_error(&self) -> bool;
}

pub trait OutcomeSerialize: fmt::Display + fmt::Debug {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn print(&self, stdout: &mut dyn io::Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Default => writeln!(stdout, "{}", self)?,
            OutputFormat::Debug => writeln!(stdout, "{:?}", self)?,
            OutputFormat::Json => {
                self.write_json(stdout)?;
                writeln!(stdout)?;
            }
        }
        Ok(())
    }
}

impl<T: Serialize + fmt::Display + fmt::Debug> OutcomeSerialize for T {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Could not print outcome as json")
    }
}

pub trait Run {
    fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>>;
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub enum Cmd {
    /// Lists known hosts and their abbreviations
    Hosts(HostsOpt),
    /// Lists visible contests
    Contests(ContestsOpt),
    /// Lists problems of a contest
    Problems(ProblemsOpt),
    /// Downloads a problem statement
    Statement(StatementOpt),
    /// Submits a solution
    Submit(SubmitOpt),
}

impl Run for Cmd {
    fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        match self {
            Self::Hosts(opt) => opt.run(global_opt, cnsl),
            Self::Contests(opt) => opt.run(global_opt, cnsl),
            Self::Problems(opt) => opt.run(global_opt, cnsl),
            Self::Statement(opt) => opt.run(global_opt, cnsl),
            Self::Submit(opt) => opt.run(global_opt, cnsl),
        }
    }
}

/// Logs in with credentials from env, or prompts for the missing ones.
fn login(act: &mut dyn Act, cnsl: &Console) -> Result<()> {
    let mut username_cnsl = cnsl.clone();
    let mut password_cnsl = cnsl.clone();
    act.login(
        &mut || {
            username_cnsl
                .read_credential(USERNAME_ENV, "username: ", false)
                .context("Could not read username")
        },
        &mut || {
            password_cnsl
                .read_credential(PASSWORD_ENV, "password: ", true)
                .context("Could not read password")
        },
    )
    .context("Could not login")
}
