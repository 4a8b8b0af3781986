use std::collections::BTreeMap;

use getset::{CopyGetters, Getters};
use maplit::btreemap;
use once_cell::sync::Lazy;

use crate::service::Act;
use crate::{client, profiles, Console, Profile, Result, ScrapeError, SessionConfig};

/// Builds a connected client for a profile.
pub type Connect = fn(Profile, &SessionConfig, Console) -> Result<Box<dyn Act>>;

#[derive(Getters, CopyGetters, Clone, Debug)]
pub struct Driver {
    #[get = "pub"]
    profile: Profile,
    #[get_copy = "pub"]
    connect: Connect,
}

impl Driver {
    pub fn new(profile: Profile, connect: Connect) -> Self {
        Self { profile, connect }
    }

    /// Driver speaking plain HTTP to the deployment described by `profile`.
    pub fn http(profile: Profile) -> Self {
        Self::new(profile, client::connect)
    }

    pub fn open(&self, conf: &SessionConfig, cnsl: Console) -> Result<Box<dyn Act>> {
        (self.connect)(self.profile.clone(), conf, cnsl)
    }
}

/// Known deployments, keyed by scheme and host without a trailing slash.
pub struct Registry {
    drivers: BTreeMap<String, Driver>,
    abbreviations: BTreeMap<&'static str, &'static str>,
}

impl Registry {
    pub fn new(
        drivers: impl IntoIterator<Item = Driver>,
        abbreviations: BTreeMap<&'static str, &'static str>,
    ) -> Self {
        let drivers = drivers
            .into_iter()
            .map(|driver| (driver.profile().host(), driver))
            .collect();
        Self {
            drivers,
            abbreviations,
        }
    }

    fn builtin() -> Self {
        Self::new(
            vec![Driver::http(profiles::staszic())],
            btreemap! {
                "staszic" => "https://sio2.staszic.waw.pl",
            },
        )
    }

    pub fn get(&self, host: &str) -> Result<&Driver> {
        self.drivers
            .get(host.trim_end_matches('/'))
            .ok_or_else(|| ScrapeError::DriverNotFound(host.to_owned()).into())
    }

    /// Looks up `name` as an abbreviation first, then as a host.
    pub fn resolve(&self, name: &str) -> Result<&Driver> {
        let host = self.abbreviations.get(name).copied().unwrap_or(name);
        self.get(host)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.drivers.keys().map(String::as_str)
    }

    pub fn abbreviations(&self) -> &BTreeMap<&'static str, &'static str> {
        &self.abbreviations
    }
}

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::builtin);

pub fn resolve(name: &str) -> Result<&'static Driver> {
    REGISTRY.resolve(name)
}
