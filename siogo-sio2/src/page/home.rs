use scraper::{ElementRef, Html};

use crate::extract;
use crate::model::ContestId;
use crate::page::GetHtml;
use crate::service::scrape::Scrape;
use crate::service::Session;
use crate::{Console, Profile, Result};

#[derive(Debug, Clone)]
pub struct HomePageBuilder<'a> {
    profile: &'a Profile,
}

impl<'a> HomePageBuilder<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    pub fn build(self, session: &mut Session, cnsl: &mut Console) -> Result<HomePage<'a>> {
        let (_, content) = self.get_html(session, cnsl)?;
        Ok(HomePage {
            builder: self,
            content,
        })
    }
}

impl GetHtml for HomePageBuilder<'_> {
    fn segments(&self) -> Vec<&str> {
        Vec::new()
    }
}

#[derive(Debug, Clone)]
pub struct HomePage<'a> {
    builder: HomePageBuilder<'a>,
    content: Html,
}

impl HomePage<'_> {
    /// Every contest link on the page, in document order.
    pub fn extract_contest_ids(&self) -> Vec<ContestId> {
        extract::extract_contest_ids(&self.content, self.builder.profile.contest_link())
    }

    pub fn current_user(&self) -> Option<String> {
        extract::extract_current_user(
            &self.content,
            self.builder.profile.ids().current_username(),
        )
    }
}

impl Scrape for HomePage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}
