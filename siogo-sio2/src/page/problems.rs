use scraper::{ElementRef, Html};

use crate::extract::{self, StatsMode};
use crate::model::{ContestId, Problems};
use crate::page::GetHtml;
use crate::service::scrape::Scrape;
use crate::service::Session;
use crate::{Console, Profile, Result};

#[derive(Debug, Clone)]
pub struct ProblemsPageBuilder<'a> {
    profile: &'a Profile,
    contest: &'a ContestId,
}

impl<'a> ProblemsPageBuilder<'a> {
    pub fn new(profile: &'a Profile, contest: &'a ContestId) -> Self {
        Self { profile, contest }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<ProblemsPage<'a>> {
        let (_, content) = self.get_html(session, cnsl)?;
        Ok(ProblemsPage {
            builder: self,
            content,
        })
    }
}

impl GetHtml for ProblemsPageBuilder<'_> {
    fn segments(&self) -> Vec<&str> {
        vec!["c", self.contest.as_ref(), "p"]
    }
}

#[derive(Debug, Clone)]
pub struct ProblemsPage<'a> {
    builder: ProblemsPageBuilder<'a>,
    content: Html,
}

impl ProblemsPage<'_> {
    /// Fails as a whole if any single row cannot be read.
    ///
    /// Rows that only reference their submit limits are completed with
    /// further requests through `session`.
    pub fn extract_problems(
        &self,
        mode: StatsMode,
        session: &mut Session,
        cnsl: &mut Console,
    ) -> Result<Problems> {
        let profile = self.builder.profile;
        let contest = self.builder.contest;
        let mut fetch_limits = |no: &str| -> Result<String> {
            let url = session.url_for(&["c", contest.as_ref(), "limits", no])?;
            let res = session.get(url, cnsl)?.error_for_status()?;
            Ok(res.text()?)
        };
        extract::select_problem_rows(&self.content, profile.problem_cells_count())
            .iter()
            .map(|cells| extract::extract_problem_row(cells, profile, mode, &mut fetch_limits))
            .collect()
    }
}

impl Scrape for ProblemsPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}
