use std::path::Path;

use reqwest::blocking::Response;

use crate::model::{ContestId, ProblemCode, Problems};
use crate::Result;

/// Produces one credential on demand, e.g. by prompting the user.
pub type Credential<'a> = &'a mut dyn FnMut() -> Result<String>;

/// Protocol spoken with a portal, independent of how requests reach it.
pub trait Act {
    fn login(&mut self, get_username: Credential, get_password: Credential) -> Result<()>;

    fn username(&self) -> Option<&str>;

    fn list_contests(&mut self) -> Result<Vec<ContestId>>;

    fn list_problems(&mut self, contest: &ContestId) -> Result<Problems>;

    fn get_problem_text(&mut self, contest: &ContestId, code: &ProblemCode) -> Result<Response>;

    /// Uploads `path` as a solution. The raw response is returned unverified.
    fn submit_solution(
        &mut self,
        contest: &ContestId,
        code: &ProblemCode,
        path: &Path,
    ) -> Result<Response>;
}
