use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::extract;
use crate::model::{ContestId, ProblemCode};
use crate::page::GetHtml;
use crate::service::scrape::Scrape;
use crate::service::Session;
use crate::{Console, Profile, Result, ScrapeError};

#[derive(Debug, Clone)]
pub struct SubmitPageBuilder<'a> {
    profile: &'a Profile,
    contest: &'a ContestId,
}

impl<'a> SubmitPageBuilder<'a> {
    pub fn new(profile: &'a Profile, contest: &'a ContestId) -> Self {
        Self { profile, contest }
    }

    /// Loads the page and checks that it renders an accepted submit control.
    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<SubmitPage<'a>> {
        let (url, content) = self.get_html(session, cnsl)?;
        if !extract::has_submit_button(&content, self.profile.submit_labels()) {
            return Err(ScrapeError::page_not_loaded("Could not find submit button").into());
        }
        Ok(SubmitPage {
            builder: self,
            url,
            content,
        })
    }
}

impl GetHtml for SubmitPageBuilder<'_> {
    fn segments(&self) -> Vec<&str> {
        vec!["c", self.contest.as_ref(), "submit"]
    }
}

#[derive(Debug, Clone)]
pub struct SubmitPage<'a> {
    builder: SubmitPageBuilder<'a>,
    url: Url,
    content: Html,
}

impl SubmitPage<'_> {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Value of the selection option for `code`.
    pub fn extract_problem_instance(&self, code: &ProblemCode) -> Result<String> {
        let select_id = self.builder.profile.ids().problem_select();
        extract::find_problem_option(&self.content, select_id, code)?
            .map(|(value, _)| value)
            .ok_or_else(|| ScrapeError::ProblemNotFound(code.to_string()).into())
    }

    pub fn file_field_name(&self) -> String {
        let profile = self.builder.profile;
        extract::extract_field_name(&self.content, profile.ids().file_input())
            .unwrap_or_else(|| profile.fields().file().to_owned())
    }
}

impl Scrape for SubmitPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}
