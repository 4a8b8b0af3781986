use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use siogo_util::model::{ContestId, Counter, Problem, ProblemCode, Problems};
use structopt::StructOpt;

use crate::cmd::{login, Outcome, Run};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ProblemsOpt {
    /// The contest to list problems from
    #[structopt(name = "contest")]
    contest: ContestId,
}

impl Run for ProblemsOpt {
    fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let (driver, mut act) = global_opt.connect(cnsl)?;
        login(act.as_mut(), cnsl)?;
        let problems = act.list_problems(&self.contest)?;
        let rows = to_rows(problems, |problem| driver.profile().format_extras(problem));
        Ok(Box::new(ProblemsOutcome {
            contest: self.contest.clone(),
            problems: rows,
        }))
    }
}

fn to_rows(
    problems: Problems,
    format_extras: impl Fn(&Problem) -> String,
) -> Vec<ProblemRow> {
    problems
        .into_iter()
        .map(|(code, problem)| ProblemRow {
            extra: format_extras(&problem),
            code,
            name: problem.name().to_owned(),
            score: problem.score(),
            extras: problem.extras().clone(),
        })
        .collect()
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProblemRow {
    code: ProblemCode,
    name: String,
    score: Option<i64>,
    #[serde(skip)]
    extra: String,
    extras: BTreeMap<String, Counter>,
}

impl fmt::Display for ProblemRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: '{}'. ", self.code, self.name)?;
        if !self.extra.is_empty() {
            write!(f, "{}. ", self.extra)?;
        }
        match self.score {
            Some(score) => write!(f, "[{}]", score),
            None => f.write_str("[?]"),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProblemsOutcome {
    contest: ContestId,
    problems: Vec<ProblemRow>,
}

impl fmt::Display for ProblemsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines = self
            .problems
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(f, "{}", lines.join("\n"))
    }
}

impl Outcome for ProblemsOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
