use std::time::Duration;

use anyhow::Context as _;
use getset::CopyGetters;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect::Policy;

use crate::Result;

static USER_AGENT: &str = concat!(
    "siogo-",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/siogo/siogo)"
);

#[derive(CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[get_copy = "pub"]
pub struct SessionConfig {
    timeout: Duration,
    retry_limit: usize,
    retry_interval: Duration,
}

impl SessionConfig {
    pub fn new(timeout: Duration, retry_limit: usize, retry_interval: Duration) -> Self {
        Self {
            timeout,
            retry_limit,
            retry_interval,
        }
    }

    pub fn get_client_builder(&self) -> ClientBuilder {
        Client::builder()
            .referer(false)
            .redirect(Policy::none()) // redirects manually
            .user_agent(USER_AGENT)
            .timeout(Some(self.timeout))
    }

    pub fn build_client(&self) -> Result<Client> {
        self.get_client_builder().build().context(
            "Could not setup client. \
             TLS backend cannot be initialized, or the resolver cannot load the system configuration.",
        )
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_limit: 4,
            retry_interval: Duration::from_secs(2),
        }
    }
}
