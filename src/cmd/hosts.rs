use std::fmt;

use serde::Serialize;
use siogo_sio2::registry::REGISTRY;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct HostsOpt {}

impl Run for HostsOpt {
    fn run(&self, _global_opt: &GlobalOpt, _cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let hosts = REGISTRY
            .hosts()
            .map(|host| HostEntry {
                host: host.to_owned(),
                abbreviations: REGISTRY
                    .abbreviations()
                    .iter()
                    .filter(|(_, target)| **target == host)
                    .map(|(abbr, _)| (*abbr).to_owned())
                    .collect(),
            })
            .collect();
        Ok(Box::new(HostsOutcome { hosts }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEntry {
    host: String,
    abbreviations: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostsOutcome {
    hosts: Vec<HostEntry>,
}

impl fmt::Display for HostsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.hosts {
            if entry.abbreviations.is_empty() {
                writeln!(f, "* {}", entry.host)?;
            } else {
                writeln!(f, "* {} ({})", entry.host, entry.abbreviations.join(", "))?;
            }
        }
        Ok(())
    }
}

impl Outcome for HostsOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
