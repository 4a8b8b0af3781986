use reqwest::Url;
use scraper::Html;

use crate::service::scrape::parse_html;
use crate::service::Session;
use crate::{Console, Result};

mod home;
mod login;
mod problems;
mod submit;

pub use home::{HomePage, HomePageBuilder};
pub use login::{LoginForm, LoginPage, LoginPageBuilder};
pub use problems::{ProblemsPage, ProblemsPageBuilder};
pub use submit::{SubmitPage, SubmitPageBuilder};

/// A page addressed by path segments below the portal's base address.
pub trait GetHtml {
    fn segments(&self) -> Vec<&str>;

    fn url(&self, session: &Session) -> Result<Url> {
        session.url_for(&self.segments())
    }

    fn get_html(&self, session: &mut Session, cnsl: &mut Console) -> Result<(Url, Html)> {
        let url = self.url(session)?;
        let html = parse_html(session.get(url.clone(), cnsl)?)?;
        Ok((url, html))
    }
}
