use std::fmt;
use std::path::PathBuf;

use reqwest::header::LOCATION;
use serde::Serialize;
use siogo_util::model::{ContestId, ProblemCode};
use siogo_util::ScrapeError;
use structopt::StructOpt;

use crate::cmd::{login, Outcome, Run};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct SubmitOpt {
    /// The contest to submit the solution to
    #[structopt(name = "contest")]
    contest: ContestId,
    /// The problem's code
    #[structopt(name = "code")]
    code: ProblemCode,
    /// Solution file
    #[structopt(name = "file", parse(from_os_str))]
    file: PathBuf,
}

impl Run for SubmitOpt {
    fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        if !self.file.is_file() {
            return Err(ScrapeError::FileNotFound(self.file.clone()).into());
        }
        let message = format!(
            "Submit solution <{}> to problem <{}> @ <{}>?",
            self.file.display(),
            self.code,
            self.contest
        );
        if !cnsl.confirm(&message, true)? {
            return Err(ScrapeError::NotUserApproved.into());
        }

        let (_, mut act) = global_opt.connect(cnsl)?;
        login(act.as_mut(), cnsl)?;
        let res = act.submit_solution(&self.contest, &self.code, &self.file)?;
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|val| val.to_str().ok())
            .map(ToOwned::to_owned);
        Ok(Box::new(SubmitOutcome {
            contest: self.contest.clone(),
            code: self.code.clone(),
            file: self.file.clone(),
            status: res.status().as_u16(),
            location,
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmitOutcome {
    contest: ContestId,
    code: ProblemCode,
    file: PathBuf,
    status: u16,
    location: Option<String>,
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Submitted {} to problem {} @ {} (status {})",
            self.file.display(),
            self.code,
            self.contest,
            self.status
        )?;
        if let Some(location) = &self.location {
            write!(f, ", see {}", location)?;
        }
        Ok(())
    }
}

impl Outcome for SubmitOutcome {
    fn is_error(&self) -> bool {
        self.status >= 400
    }
}
