use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::extract;
use crate::model::ContestId;
use crate::page::GetHtml;
use crate::service::scrape::Scrape;
use crate::service::Session;
use crate::{Console, Profile, Result, ScrapeError};

#[derive(Debug, Clone)]
pub struct LoginPageBuilder<'a> {
    profile: &'a Profile,
    contest: &'a ContestId,
}

impl<'a> LoginPageBuilder<'a> {
    pub fn new(profile: &'a Profile, contest: &'a ContestId) -> Self {
        Self { profile, contest }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<LoginPage<'a>> {
        let (url, content) = self.get_html(session, cnsl)?;
        Ok(LoginPage {
            builder: self,
            url,
            content,
        })
    }
}

impl GetHtml for LoginPageBuilder<'_> {
    fn segments(&self) -> Vec<&str> {
        vec!["c", self.contest.as_ref(), "login"]
    }
}

/// Field names the login form posts credentials under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginPage<'a> {
    builder: LoginPageBuilder<'a>,
    url: Url,
    content: Html,
}

impl LoginPage<'_> {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn extract_form(&self) -> Result<LoginForm> {
        let ids = self.builder.profile.ids();
        if self.find_by_id(ids.confirm_login()).is_none() {
            return Err(ScrapeError::page_not_loaded(format!(
                "Could not find login button #{}",
                ids.confirm_login()
            ))
            .into());
        }
        Ok(LoginForm {
            username: self.field_name(ids.username())?,
            password: self.field_name(ids.password())?,
        })
    }

    fn field_name(&self, id: &str) -> Result<String> {
        extract::extract_field_name(&self.content, id).ok_or_else(|| {
            ScrapeError::page_not_loaded(format!("Could not find login field #{}", id)).into()
        })
    }
}

impl Scrape for LoginPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}
