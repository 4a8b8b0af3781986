use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Problems in the order the contest's table lists them.
pub type Problems = IndexMap<ProblemCode, Problem>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ProblemCode(String);

impl ProblemCode {
    /// The code as it appears at the end of a problem selection label.
    pub fn parenthesized(&self) -> String {
        format!("({})", self.0)
    }
}

impl<T: Into<String>> From<T> for ProblemCode {
    fn from(code: T) -> Self {
        Self(code.into())
    }
}

impl FromStr for ProblemCode {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ProblemCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProblemCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A statistic scraped next to a problem, e.g. the number of submits used.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Counter {
    Known(u64),
    /// The page did not render the statistic and the caller tolerated that.
    NotANumber,
}

impl Counter {
    pub fn value(self) -> Option<u64> {
        match self {
            Self::Known(n) => Some(n),
            Self::NotANumber => None,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{}", n),
            Self::NotANumber => f.write_str("NaN"),
        }
    }
}

impl Serialize for Counter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Known(n) => serializer.serialize_u64(*n),
            Self::NotANumber => serializer.serialize_str("NaN"),
        }
    }
}

#[derive(Serialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    #[get = "pub"]
    name: String,
    /// `None` until the user has a scored submission.
    #[get_copy = "pub"]
    score: Option<i64>,
    #[get = "pub"]
    extras: BTreeMap<String, Counter>,
}

impl Problem {
    pub fn new(name: impl Into<String>, score: Option<i64>) -> Self {
        Self {
            name: name.into(),
            score,
            extras: BTreeMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Counter) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn extra(&self, key: &str) -> Option<Counter> {
        self.extras.get(key).copied()
    }
}
