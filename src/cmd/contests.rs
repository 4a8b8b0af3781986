use std::fmt;

use serde::Serialize;
use siogo_util::model::ContestId;
use structopt::StructOpt;

use crate::cmd::{login, Outcome, Run};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ContestsOpt {}

impl Run for ContestsOpt {
    fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let (driver, mut act) = global_opt.connect(cnsl)?;
        login(act.as_mut(), cnsl)?;
        let contests = act.list_contests()?;
        Ok(Box::new(ContestsOutcome {
            host: driver.profile().host(),
            contests,
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContestsOutcome {
    host: String,
    contests: Vec<ContestId>,
}

impl fmt::Display for ContestsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines = self
            .contests
            .iter()
            .map(|contest| format!("* {}", contest))
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

impl Outcome for ContestsOutcome {
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let outcome = ContestsOutcome {
            host: "https://sio2.example.com".into(),
            contests: vec!["b".into(), "a".into()],
        };
        assert_eq!(outcome.to_string(), "* b\n* a");
    }
}
