use std::time::Duration;

use anyhow::{anyhow, Context as _};
use reqwest::blocking::{Client, Request, RequestBuilder, Response};
use reqwest::{Method, StatusCode, Url};
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{ErrorKind, ScrapeError};
use crate::retries::with_retries;
use crate::service::{CookieStorage, ResponseExt as _};
use crate::{Console, Error, Result};

static MAX_REDIRECTS: usize = 10;

trait ExecSession {
    fn exec_session(&self, request: Request, cookies: &mut CookieStorage) -> Result<Response>;
}

impl ExecSession for Client {
    fn exec_session(&self, mut request: Request, cookies: &mut CookieStorage) -> Result<Response> {
        for _ in 0..=MAX_REDIRECTS {
            cookies
                .load_into(&mut request)
                .context("Could not load cookies into request")?;
            let follow = request.method() == Method::GET;
            let response = self.execute(request)?;
            cookies.store_from(&response);
            if !(follow && is_followed_redirect(response.status())) {
                return Ok(response);
            }
            let next = response.location_url(response.url())?;
            debug!(from = %response.url(), to = %next, "following redirect");
            request = self.get(next).build()?;
        }
        Err(anyhow!("Exceeded {} redirects", MAX_REDIRECTS))
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

pub struct RetryRequestBuilder<'a> {
    inner: RequestBuilder,
    client: &'a Client,
    cookies: &'a mut CookieStorage,
    retry_limit: usize,
    retry_interval: Duration,
    cnsl: &'a mut Console,
}

fn send_logged(
    client: &Client,
    cookies: &mut CookieStorage,
    cnsl: &mut Console,
    req: Request,
) -> Result<Response> {
    cnsl.start_request(req.method(), req.url());
    let result = client
        .exec_session(req, cookies)
        .context("Could not send request");
    cnsl.finish_request(result.as_ref().ok().map(Response::status));
    result
}

impl<'a> RetryRequestBuilder<'a> {
    pub fn send_pretty(&mut self) -> Result<Response> {
        let req = self
            .inner
            .try_clone()
            .ok_or_else(|| Error::msg("Could not build request"))?
            .build()?;
        send_logged(self.client, self.cookies, self.cnsl, req)
    }

    /// Sends a request whose body cannot be cloned, e.g. a multipart upload. Never retried.
    pub fn send_once(self) -> Result<Response> {
        let Self {
            inner,
            client,
            cookies,
            cnsl,
            ..
        } = self;
        send_logged(client, cookies, cnsl, inner.build()?)
    }

    pub fn retry_send(&mut self) -> Result<Response> {
        let retry_limit = self.retry_limit;
        let retry_interval = self.retry_interval;
        with_retries(
            || {
                let res = self.send_pretty()?;
                if res.status().is_server_error() {
                    Err(ScrapeError::ServerError(res.status()).into())
                } else {
                    Ok(res)
                }
            },
            &[ErrorKind::ServerError],
            retry_limit,
            retry_interval,
        )
    }
}

pub trait WithRetry {
    fn with_retry<'a>(
        self,
        client: &'a Client,
        cookies: &'a mut CookieStorage,
        retry_limit: usize,
        retry_interval: Duration,
        cnsl: &'a mut Console,
    ) -> RetryRequestBuilder<'a>;
}

impl WithRetry for RequestBuilder {
    fn with_retry<'a>(
        self,
        client: &'a Client,
        cookies: &'a mut CookieStorage,
        retry_limit: usize,
        retry_interval: Duration,
        cnsl: &'a mut Console,
    ) -> RetryRequestBuilder<'a> {
        RetryRequestBuilder {
            inner: self,
            client,
            cookies,
            retry_limit,
            retry_interval,
            cnsl,
        }
    }
}

/// One HTTP conversation with a portal.
///
/// A session is owned by exactly one client and is not meant to be shared
/// between threads; every request goes through `&mut self`.
pub struct Session {
    client: Client,
    cookies: CookieStorage,
    base_url: Url,
    conf: SessionConfig,
    username: Option<String>,
}

impl Session {
    pub fn new(base_url: Url, conf: &SessionConfig) -> Result<Self> {
        Ok(Self {
            client: conf.build_client()?,
            cookies: CookieStorage::new(),
            base_url,
            conf: conf.clone(),
            username: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn conf(&self) -> &SessionConfig {
        &self.conf
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_logged_in(&mut self, username: String) {
        self.username = Some(username);
    }

    pub fn ensure_logged_in(&self) -> Result<()> {
        if self.is_logged_in() {
            Ok(())
        } else {
            Err(ScrapeError::NotLoggedIn.into())
        }
    }

    /// Builds `<base>/<segments...>/`, the trailing slash included.
    ///
    /// Every segment is percent-encoded, so a `/`, `?` or `#` inside one stays in the path.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Could not use url as base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Reads a cookie from the jar as it stands now.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(&self.base_url, name)
    }

    pub fn get(&mut self, url: Url, cnsl: &mut Console) -> Result<Response> {
        let Self {
            client,
            cookies,
            conf,
            ..
        } = self;
        client
            .get(url)
            .with_retry(
                client,
                cookies,
                conf.retry_limit(),
                conf.retry_interval(),
                cnsl,
            )
            .retry_send()
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    pub fn send_once(&mut self, request: RequestBuilder, cnsl: &mut Console) -> Result<Response> {
        let Self {
            client,
            cookies,
            conf,
            ..
        } = self;
        request
            .with_retry(
                client,
                cookies,
                conf.retry_limit(),
                conf.retry_interval(),
                cnsl,
            )
            .send_once()
    }
}
