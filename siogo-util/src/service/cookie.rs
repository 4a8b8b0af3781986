use std::convert::TryFrom as _;

use cookie::Cookie as RawCookie;
use cookie_store::CookieStore;
use reqwest::blocking::{Request, Response};
use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use reqwest::Url;

use crate::Result;

/// Cookie jar of one session. Lives in memory only.
#[derive(Default)]
pub struct CookieStorage {
    store: CookieStore,
}

impl CookieStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_into(&self, request: &mut Request) -> Result<()> {
        let cookies = self
            .store
            .get_request_values(request.url())
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>();
        if !cookies.is_empty() {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::try_from(cookies.join("; "))?);
        }
        Ok(())
    }

    pub fn store_from(&mut self, response: &Response) {
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|val| {
                val.to_str()
                    .ok()
                    .and_then(|cookie_str| RawCookie::parse(cookie_str.to_owned()).ok())
            });
        let url = response.url();
        self.store.store_response_cookies(cookies, url);
    }

    /// Returns the value of the cookie `name` that would be sent to `url`.
    pub fn get(&self, url: &Url, name: &str) -> Option<&str> {
        self.store
            .get_request_values(url)
            .find(|(cookie_name, _)| *cookie_name == name)
            .map(|(_, value)| value)
    }
}
