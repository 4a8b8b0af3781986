//! Pure functions turning SIO2 pages into records.

use anyhow::{anyhow, Context as _};
use regex::Regex;
use scraper::{ElementRef, Html};
use siogo_util::{regex, select};

use crate::model::{ContestId, Counter, Problem, ProblemCode};
use crate::service::scrape::Scrape;
use crate::{Profile, Result, ScrapeError};

/// How to treat a statistics cell that the page has not filled in yet.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StatsMode {
    /// Fail with `PageNotLoaded` so that the caller may retry.
    Required,
    /// Substitute `Counter::NotANumber`.
    Optional,
}

/// Fetches the body of `/c/<contest>/limits/<N>/` for the `N` of a `limits_<N>` block.
pub type FetchLimits<'a> = dyn FnMut(&str) -> Result<String> + 'a;

/// Contest ids of all anchors matching `pattern`, in document order, duplicates kept.
pub fn extract_contest_ids(html: &Html, pattern: &Regex) -> Vec<ContestId> {
    html.select(select!("a"))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| pattern.captures(href))
        .filter_map(|caps| caps.get(1))
        .map(|m| ContestId::from(m.as_str()))
        .collect()
}

/// Cells of the table rows that have exactly `cells_count` data cells.
pub fn select_problem_rows(html: &Html, cells_count: usize) -> Vec<Vec<ElementRef<'_>>> {
    html.select(select!("tr"))
        .map(|row| row.select(select!("td")).collect::<Vec<_>>())
        .filter(|cells| cells.len() == cells_count)
        .collect()
}

pub fn extract_problem_row(
    cells: &[ElementRef<'_>],
    profile: &Profile,
    mode: StatsMode,
    fetch_limits: &mut FetchLimits<'_>,
) -> Result<(ProblemCode, Problem)> {
    profile.extract_row(cells, mode, fetch_limits)
}

/// Blank cells mean that nothing has been scored yet.
pub fn parse_score(text: &str) -> Result<Option<i64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse()
        .map(Some)
        .with_context(|| format!("Could not parse score : {}", text))
}

fn cell<'a, 'b>(cells: &'b [ElementRef<'a>], index: usize) -> Result<&'b ElementRef<'a>> {
    cells
        .get(index)
        .ok_or_else(|| anyhow!("Could not find cell {} of problem row", index))
}

fn extract_code_name_score(cells: &[ElementRef<'_>]) -> Result<(ProblemCode, String, Option<i64>)> {
    let code = ProblemCode::from(cell(cells, 0)?.inner_text().trim());
    let name_cell = cell(cells, 1)?;
    let name = name_cell
        .find_first(select!("a"))
        .map(|a| a.inner_text())
        .unwrap_or_else(|| name_cell.inner_text());
    let score = parse_score(&cell(cells, 3)?.inner_text())?;
    Ok((code, name.trim().to_owned(), score))
}

/// Row of a stock deployment: code, name, (unused), score.
pub fn extract_scored_row(
    cells: &[ElementRef<'_>],
    _mode: StatsMode,
    _fetch_limits: &mut FetchLimits<'_>,
) -> Result<(ProblemCode, Problem)> {
    let (code, name, score) = extract_code_name_score(cells)?;
    Ok((code, Problem::new(name, score)))
}

/// Row whose third cell holds `<used> / <limit>` submits.
///
/// A rendered page carries the numbers in a `span`. A plain one only has an
/// empty `div` with id `limits_<N>`, whose numbers are served separately.
pub fn extract_row_with_submits(
    cells: &[ElementRef<'_>],
    mode: StatsMode,
    fetch_limits: &mut FetchLimits<'_>,
) -> Result<(ProblemCode, Problem)> {
    let (code, name, score) = extract_code_name_score(cells)?;
    let (submits, total_submits) = match submits_text(cell(cells, 2)?, fetch_limits)? {
        Some(text) => parse_submits(&text)?,
        None if mode == StatsMode::Required => {
            return Err(ScrapeError::page_not_loaded("Submit info was not loaded").into())
        }
        None => (Counter::NotANumber, Counter::NotANumber),
    };
    let problem = Problem::new(name, score)
        .with_extra("submits", submits)
        .with_extra("total_submits", total_submits);
    Ok((code, problem))
}

fn submits_text(
    cell: &ElementRef<'_>,
    fetch_limits: &mut FetchLimits<'_>,
) -> Result<Option<String>> {
    if let Some(span) = cell.find_first(select!("span")) {
        return Ok(Some(span.inner_text()));
    }
    let limits_no = cell
        .find_first(select!("div"))
        .and_then(|div| div.value().id())
        .and_then(|id| id.strip_prefix("limits_"))
        .filter(|no| !no.is_empty());
    let limits_no = match limits_no {
        Some(no) => no,
        None => return Ok(None),
    };
    let body = fetch_limits(limits_no)
        .with_context(|| format!("Could not fetch limits {}", limits_no))?;
    if body.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(body))
    }
}

fn parse_submits(text: &str) -> Result<(Counter, Counter)> {
    let caps = regex!(r"^\s*(\d+)\s*/\s*(\d+)\s*$")
        .captures(text)
        .with_context(|| format!("Could not parse submit info : {}", text))?;
    Ok((
        Counter::Known(caps[1].parse()?),
        Counter::Known(caps[2].parse()?),
    ))
}

pub fn format_submits(problem: &Problem) -> String {
    match (problem.extra("submits"), problem.extra("total_submits")) {
        (Some(used), Some(limit)) => format!("{} / {}", used, limit),
        _ => String::new(),
    }
}

/// Trimmed text of the element showing the logged in user.
pub fn extract_current_user(html: &Html, id: &str) -> Option<String> {
    html.find_by_id(id)
        .map(|elem| elem.inner_text().trim().to_owned())
}

/// Value and label of the option whose label ends with `(<code>)`.
pub fn find_problem_option(
    html: &Html,
    select_id: &str,
    code: &ProblemCode,
) -> Result<Option<(String, String)>> {
    let selection = html.find_by_id(select_id).ok_or_else(|| {
        ScrapeError::page_not_loaded(format!("Could not find problem selection #{}", select_id))
    })?;
    let suffix = code.parenthesized();
    let found = selection.select(select!("option")).find_map(|opt| {
        let label = opt.inner_text();
        if label.trim().ends_with(&suffix) {
            let value = opt.value().attr("value").unwrap_or_default().to_owned();
            Some((value, label.trim().to_owned()))
        } else {
            None
        }
    });
    Ok(found)
}

/// Whether the page renders a submit control labelled with one of `labels`.
pub fn has_submit_button(html: &Html, labels: &[&str]) -> bool {
    let buttons = html
        .select(select!("button"))
        .map(|button| button.inner_text().trim().to_owned());
    let inputs = html
        .select(select!("input[type=\"submit\"]"))
        .filter_map(|input| input.value().attr("value"))
        .map(|value| value.trim().to_owned());
    buttons
        .chain(inputs)
        .any(|label| labels.contains(&label.as_str()))
}

/// `name` attribute of the element with the given id.
pub fn extract_field_name(html: &Html, id: &str) -> Option<String> {
    html.find_by_id(id)
        .and_then(|elem| elem.value().attr("name"))
        .map(ToOwned::to_owned)
}
