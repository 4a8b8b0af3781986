use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use siogo_util::model::{ContestId, ProblemCode};
use siogo_util::ScrapeError;
use structopt::StructOpt;

use crate::cmd::{login, Outcome, Run};
use crate::{Console, GlobalOpt, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct StatementOpt {
    #[structopt(name = "contest")]
    contest: ContestId,
    #[structopt(name = "code")]
    code: ProblemCode,
    /// Where to save the statement. Defaults to `<code>.<ext>` in the current directory
    #[structopt(long, short, parse(from_os_str))]
    output: Option<PathBuf>,
}

impl Run for StatementOpt {
    fn run(&self, global_opt: &GlobalOpt, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let (_, mut act) = global_opt.connect(cnsl)?;
        login(act.as_mut(), cnsl)?;
        let res = act.get_problem_text(&self.contest, &self.code)?;
        if !res.status().is_success() {
            return Err(ScrapeError::page_not_loaded(format!(
                "Statement of {} returned {}",
                self.code,
                res.status()
            ))
            .into());
        }
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .map(ToOwned::to_owned);
        let path = self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}.{}",
                self.code,
                extension_for(content_type.as_deref())
            ))
        });
        let body = res.bytes().context("Could not read statement")?;
        fs::write(&path, &body)
            .with_context(|| format!("Could not write statement to {}", path.display()))?;
        Ok(Box::new(StatementOutcome {
            contest: self.contest.clone(),
            code: self.code.clone(),
            path,
            content_type,
            size: body.len(),
        }))
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let mime = content_type
        .and_then(|val| val.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some("application/pdf") => "pdf",
        Some("text/html") => "html",
        _ => "txt",
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementOutcome {
    contest: ContestId,
    code: ProblemCode,
    path: PathBuf,
    content_type: Option<String>,
    size: usize,
}

impl fmt::Display for StatementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Saved statement of {} @ {} to {} ({} bytes)",
            self.code,
            self.contest,
            self.path.display(),
            self.size
        )
    }
}

impl Outcome for StatementOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
