use anyhow::Context as _;
use reqwest::blocking::Response;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::Result;

/// Parses a page body, treating any non-success status as a page that is not loaded.
pub fn parse_html(response: Response) -> Result<Html> {
    let status = response.status();
    if !status.is_success() {
        let url = response.url().clone();
        return Err(ScrapeError::page_not_loaded(format!("{} returned {}", url, status)).into());
    }
    let text = response.text().context("Could not read response body")?;
    Ok(Html::parse_document(&text))
}

pub trait Scrape {
    fn elem(&self) -> ElementRef;

    fn find_first(&self, selector: &Selector) -> Option<ElementRef> {
        self.elem().select(selector).next()
    }

    fn find_by_id(&self, id: &str) -> Option<ElementRef> {
        self.elem()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|elem| elem.value().id() == Some(id))
    }

    fn inner_text(&self) -> String {
        self.elem().text().collect()
    }
}

impl Scrape for ElementRef<'_> {
    fn elem(&self) -> ElementRef {
        *self
    }
}

impl Scrape for Html {
    fn elem(&self) -> ElementRef {
        self.root_element()
    }
}
