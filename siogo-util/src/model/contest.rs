use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ContestId(String);

impl<T: Into<String>> From<T> for ContestId {
    fn from(id: T) -> Self {
        Self(id.into())
    }
}

impl FromStr for ContestId {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for ContestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Removes duplicates so that each id stays at the position of its last occurrence.
pub fn promote_last_seen(ids: impl IntoIterator<Item = ContestId>) -> Vec<ContestId> {
    let mut ret: Vec<ContestId> = Vec::new();
    for id in ids {
        if let Some(pos) = ret.iter().position(|seen| seen == &id) {
            ret.remove(pos);
        }
        ret.push(id);
    }
    ret
}
