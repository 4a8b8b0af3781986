use std::fmt;

use anyhow::Context as _;
use getset::{CopyGetters, Getters};
use regex::Regex;
use reqwest::Url;
use scraper::ElementRef;
use siogo_util::regex;

use crate::extract::{self, FetchLimits, StatsMode};
use crate::model::{Problem, ProblemCode};
use crate::Result;

/// Turns the cells of one problem table row into a problem record.
pub type RowExtractor =
    fn(&[ElementRef<'_>], StatsMode, &mut FetchLimits<'_>) -> Result<(ProblemCode, Problem)>;

/// Renders the deployment specific extras of a problem for display.
pub type ExtrasFormatter = fn(&Problem) -> String;

fn no_extras(_: &Problem) -> String {
    String::new()
}

/// DOM ids of the controls a deployment renders.
#[derive(Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct ElementIds {
    username: String,
    password: String,
    confirm_login: String,
    current_username: String,
    problem_select: String,
    file_input: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            username: "id_username".into(),
            password: "id_password".into(),
            confirm_login: "id_submit".into(),
            current_username: "navbar-username".into(),
            problem_select: "id_problem_instance_id".into(),
            file_input: "id_file".into(),
        }
    }
}

/// Names of the form fields and cookies the server expects.
#[derive(Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct FormFields {
    csrf_cookie: String,
    csrf_field: String,
    problem_instance: String,
    /// Used when the file input renders without a `name`.
    file: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            csrf_cookie: "csrftoken".into(),
            csrf_field: "csrfmiddlewaretoken".into(),
            problem_instance: "problem_instance_id".into(),
            file: "file".into(),
        }
    }
}

/// Everything that differs between two deployments of the portal.
///
/// A profile is built once and handed to a client; the `with_*` methods
/// consume it and return the changed copy.
#[derive(Getters, CopyGetters, Clone)]
pub struct Profile {
    #[get = "pub"]
    base_url: Url,
    #[get = "pub"]
    contest_link: Regex,
    #[get = "pub"]
    ids: ElementIds,
    #[get = "pub"]
    fields: FormFields,
    #[get_copy = "pub"]
    submit_labels: &'static [&'static str],
    #[get_copy = "pub"]
    problem_cells_count: usize,
    row_extractor: RowExtractor,
    extras_formatter: ExtrasFormatter,
}

impl Profile {
    /// Profile of a stock SIO2 deployment at `base_url`.
    pub fn sio2(base_url: Url) -> Self {
        Self {
            base_url,
            contest_link: Regex::clone(regex!(r"^/c/([^/]+)/")),
            ids: ElementIds::default(),
            fields: FormFields::default(),
            submit_labels: &["Submit"],
            problem_cells_count: 4,
            row_extractor: extract::extract_scored_row,
            extras_formatter: no_extras,
        }
    }

    pub fn parse(base_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Could not parse url: {}", base_url))?;
        Ok(Self::sio2(base_url))
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_ids(mut self, ids: ElementIds) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_submit_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.submit_labels = labels;
        self
    }

    pub fn with_rows(mut self, cells_count: usize, extractor: RowExtractor) -> Self {
        self.problem_cells_count = cells_count;
        self.row_extractor = extractor;
        self
    }

    pub fn with_extras_formatter(mut self, formatter: ExtrasFormatter) -> Self {
        self.extras_formatter = formatter;
        self
    }

    /// Address the profile is registered under: scheme and host, no trailing slash.
    pub fn host(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_owned()
    }

    pub fn extract_row(
        &self,
        cells: &[ElementRef<'_>],
        mode: StatsMode,
        fetch_limits: &mut FetchLimits<'_>,
    ) -> Result<(ProblemCode, Problem)> {
        (self.row_extractor)(cells, mode, fetch_limits)
    }

    pub fn format_extras(&self, problem: &Problem) -> String {
        (self.extras_formatter)(problem)
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Profile")
            .field("base_url", &self.base_url.as_str())
            .field("contest_link", &self.contest_link.as_str())
            .field("ids", &self.ids)
            .field("fields", &self.fields)
            .field("submit_labels", &self.submit_labels)
            .field("problem_cells_count", &self.problem_cells_count)
            .finish()
    }
}
