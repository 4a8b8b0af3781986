use std::path::Path;

use anyhow::Context as _;
use maplit::hashmap;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Response;
use reqwest::header::REFERER;
use tracing::{debug, info};

use crate::extract::StatsMode;
use crate::model::{promote_last_seen, ContestId, ProblemCode, Problems};
use crate::page::{HomePageBuilder, LoginPageBuilder, ProblemsPageBuilder, SubmitPageBuilder};
use crate::service::act::Credential;
use crate::service::{Act, Session};
use crate::{Console, ErrorKind, Profile, Result, ScrapeError, SessionConfig};
use siogo_util::retries::with_retries;

/// Talks to one SIO2 deployment over plain HTTP.
pub struct Sio2Client {
    profile: Profile,
    session: Session,
    cnsl: Console,
}

impl Sio2Client {
    pub fn new(profile: Profile, conf: &SessionConfig, cnsl: Console) -> Result<Self> {
        let session = Session::new(profile.base_url().clone(), conf)?;
        Ok(Self {
            profile,
            session,
            cnsl,
        })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    fn csrf_token(&self) -> Result<String> {
        let name = self.profile.fields().csrf_cookie();
        let token = self
            .session
            .cookie(name)
            .with_context(|| format!("Could not find csrf token in cookie {}", name))?;
        debug!(cookie = name.as_str(), "read csrf token");
        Ok(token.to_owned())
    }
}

impl Act for Sio2Client {
    fn login(&mut self, get_username: Credential, get_password: Credential) -> Result<()> {
        let ids = HomePageBuilder::new(&self.profile)
            .build(&mut self.session, &mut self.cnsl)?
            .extract_contest_ids();
        let contest = promote_last_seen(ids)
            .into_iter()
            .next()
            .ok_or_else(|| ScrapeError::page_not_loaded("Could not find any contest to log in"))?;

        let login_page = LoginPageBuilder::new(&self.profile, &contest)
            .build(&mut self.session, &mut self.cnsl)?;
        let form = login_page.extract_form()?;
        let login_url = login_page.url().clone();

        let username = get_username().context("Could not read username")?;
        let password = get_password().context("Could not read password")?;
        let token = self.csrf_token()?;
        let payload = hashmap!(
            self.profile.fields().csrf_field().as_str() => token.as_str(),
            form.username.as_str() => username.as_str(),
            form.password.as_str() => password.as_str(),
        );
        let request = self
            .session
            .post(login_url.clone())
            .header(REFERER, login_url.as_str())
            .form(&payload);
        let res = self.session.send_once(request, &mut self.cnsl)?;
        debug!(status = %res.status(), "posted login form");

        let current_user = HomePageBuilder::new(&self.profile)
            .build(&mut self.session, &mut self.cnsl)?
            .current_user();
        if current_user.as_deref() != Some(username.as_str()) {
            return Err(ScrapeError::LoginFailed {
                expected: username,
                actual: current_user,
            }
            .into());
        }
        info!(user = username.as_str(), "logged in");
        self.session.set_logged_in(username);
        Ok(())
    }

    fn username(&self) -> Option<&str> {
        self.session.username()
    }

    fn list_contests(&mut self) -> Result<Vec<ContestId>> {
        self.session.ensure_logged_in()?;
        let ids = HomePageBuilder::new(&self.profile)
            .build(&mut self.session, &mut self.cnsl)?
            .extract_contest_ids();
        Ok(promote_last_seen(ids))
    }

    fn list_problems(&mut self, contest: &ContestId) -> Result<Problems> {
        self.session.ensure_logged_in()?;
        let Self {
            profile,
            session,
            cnsl,
        } = self;
        let retry_limit = session.conf().retry_limit();
        let retry_interval = session.conf().retry_interval();
        with_retries(
            || {
                ProblemsPageBuilder::new(profile, contest)
                    .build(session, cnsl)?
                    .extract_problems(StatsMode::Required, session, cnsl)
            },
            &[ErrorKind::PageNotLoaded],
            retry_limit,
            retry_interval,
        )
        .with_context(|| format!("Could not list problems of contest {}", contest))
    }

    fn get_problem_text(&mut self, contest: &ContestId, code: &ProblemCode) -> Result<Response> {
        self.session.ensure_logged_in()?;
        let url = self
            .session
            .url_for(&["c", contest.as_ref(), "p", code.as_ref()])?;
        self.session.get(url, &mut self.cnsl)
    }

    fn submit_solution(
        &mut self,
        contest: &ContestId,
        code: &ProblemCode,
        path: &Path,
    ) -> Result<Response> {
        self.session.ensure_logged_in()?;
        if !path.is_file() {
            return Err(ScrapeError::FileNotFound(path.to_owned()).into());
        }

        let submit_page = SubmitPageBuilder::new(&self.profile, contest)
            .build(&mut self.session, &mut self.cnsl)?;
        let problem_instance = submit_page.extract_problem_instance(code)?;
        let file_field = submit_page.file_field_name();
        let submit_url = submit_page.url().clone();

        let fields = self.profile.fields();
        let form = Form::new()
            .text(fields.csrf_field().clone(), self.csrf_token()?)
            .text(fields.problem_instance().clone(), problem_instance)
            .file(file_field, path)
            .with_context(|| format!("Could not read solution file : {}", path.display()))?;
        let request = self
            .session
            .post(submit_url.clone())
            .header(REFERER, submit_url.as_str())
            .multipart(form);
        self.session.send_once(request, &mut self.cnsl)
    }
}

/// Connects a client for `profile`, behind the transport-agnostic interface.
pub fn connect(profile: Profile, conf: &SessionConfig, cnsl: Console) -> Result<Box<dyn Act>> {
    Ok(Box::new(Sio2Client::new(profile, conf, cnsl)?))
}
