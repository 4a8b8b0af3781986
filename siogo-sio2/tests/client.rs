use std::io::Write as _;
use std::time::Duration;

use mockito::{Matcher, Mock, Server};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use siogo_sio2::{profiles, Driver, ErrorKind, Profile, SessionConfig, Sio2Client};
use siogo_util::model::{ContestId, Counter, ProblemCode};
use siogo_util::service::Act as _;
use siogo_util::{Console, ConsoleConfig, ErrorExt as _};

static ANCHORS: &str = r#"
<a href="/">Home</a>
<a href="/c/a/">Contest A</a>
<a href="/c/b/dashboard/">Contest B</a>
<a href="/c/a/p/">Problems of A</a>
<a href="/c/c/">Contest C</a>
<a>Anchor without link</a>
"#;

static LOGIN_HTML: &str = r#"
<html><body><form method="post">
<input type="hidden" name="csrfmiddlewaretoken" value="from-form">
<input type="text" id="id_username" name="username">
<input type="password" id="id_password" name="password">
<button type="submit" id="id_submit">Log in</button>
</form></body></html>
"#;

static PROBLEMS_HTML: &str = r#"
<html><body><table>
<thead><tr><th>Code</th><th>Name</th><th>Submits</th><th>Score</th></tr></thead>
<tbody>
<tr><td colspan="4">Round 1</td></tr>
<tr><td>a1</td><td><a href="/c/b/p/a1/">Sum</a></td><td><div id="limits_1"><span>1 / 10</span></div></td><td>100</td></tr>
<tr><td>a12</td><td><a href="/c/b/p/a12/">Product</a></td><td><div id="limits_2"><span>0 / 10</span></div></td><td> </td></tr>
</tbody>
</table></body></html>
"#;

static PROBLEMS_PLAIN_HTML: &str = r#"
<html><body><table>
<tr><td>a2</td><td><a href="/c/b/p/a2/">Difference</a></td><td><div id="limits_2"></div></td><td></td></tr>
<tr><td>a10</td><td><a href="/c/b/p/a10/">Sum</a></td><td><div id="limits_1"></div></td><td>100</td></tr>
</table></body></html>
"#;

static PROBLEMS_NOT_LOADED_HTML: &str = r#"
<html><body><table>
<tr><td>a1</td><td><a href="/c/b/p/a1/">Sum</a></td><td><div></div></td><td>100</td></tr>
</table></body></html>
"#;

static SUBMIT_HTML: &str = r#"
<html><body><form method="post" enctype="multipart/form-data">
<select id="id_problem_instance_id" name="problem_instance_id">
<option value="" selected>---------</option>
<option value="11">Product (a12)</option>
<option value="12">Sum (a1)</option>
</select>
<input type="file" id="id_file" name="file">
<button type="submit" class="btn btn-primary">Wyślij</button>
</form></body></html>
"#;

fn conf() -> SessionConfig {
    SessionConfig::new(Duration::from_secs(10), 3, Duration::from_millis(0))
}

fn home_html(user: Option<&str>) -> String {
    let user = user
        .map(|user| format!(r#"<span id="navbar-username">{}</span>"#, user))
        .unwrap_or_default();
    format!(
        "<html><body><nav>{}</nav>{}<a href=\"/c/a/\">again</a>{}</body></html>",
        user, ANCHORS, ANCHORS
    )
}

fn credential(value: &'static str) -> impl FnMut() -> anyhow::Result<String> {
    move || Ok(value.to_owned())
}

fn new_client(server: &Server, profile: Profile) -> anyhow::Result<Sio2Client> {
    new_client_with_console(server, profile, Console::sink(ConsoleConfig::default()))
}

fn new_client_with_console(
    server: &Server,
    profile: Profile,
    cnsl: Console,
) -> anyhow::Result<Sio2Client> {
    let profile = profile.with_base_url(server.url().parse()?);
    Sio2Client::new(profile, &conf(), cnsl)
}

/// Mocks the whole login conversation. The home page greets `shown_user` once logged in.
fn mock_login(server: &mut Server, shown_user: &str) -> Vec<Mock> {
    let login_url = format!("{}/c/b/login/", server.url());
    vec![
        server
            .mock("GET", "/")
            .match_header("cookie", Matcher::Missing)
            .with_body(home_html(None))
            .expect(1)
            .create(),
        server
            .mock("GET", "/c/b/login/")
            .with_header("set-cookie", "csrftoken=tok1; Path=/")
            .with_body(LOGIN_HTML)
            .expect(1)
            .create(),
        server
            .mock("POST", "/c/b/login/")
            .match_header("referer", login_url.as_str())
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("csrfmiddlewaretoken".into(), "tok1".into()),
                Matcher::UrlEncoded("username".into(), "alice".into()),
                Matcher::UrlEncoded("password".into(), "secret".into()),
            ]))
            .with_status(302)
            .with_header("location", "/")
            .with_header("set-cookie", "sessionid=s1; Path=/")
            .expect(1)
            .create(),
        server
            .mock("GET", "/")
            .match_header("cookie", Matcher::Regex("sessionid=s1".into()))
            .with_body(home_html(Some(shown_user)))
            .expect_at_least(1)
            .create(),
    ]
}

fn logged_in(server: &mut Server, profile: Profile) -> anyhow::Result<(Sio2Client, Vec<Mock>)> {
    let mocks = mock_login(server, "alice");
    let mut client = new_client(server, profile)?;
    client.login(&mut credential("alice"), &mut credential("secret"))?;
    Ok((client, mocks))
}

#[test]
fn test_login_and_list_contests() -> anyhow::Result<()> {
    let mut server = Server::new();
    let mocks = mock_login(&mut server, "alice");
    let cnsl = Console::buf(ConsoleConfig::default());
    let mut client = new_client_with_console(&server, profiles::staszic(), cnsl.clone())?;
    client.login(&mut credential("alice"), &mut credential("secret"))?;
    assert!(client.is_logged_in());
    assert_eq!(client.username(), Some("alice"));

    let contests = client.list_contests()?;
    let expected: Vec<ContestId> = vec!["b".into(), "a".into(), "c".into()];
    assert_eq!(contests, expected);

    for mock in mocks {
        mock.assert();
    }
    let output = cnsl.take_output()?;
    assert!(output.contains("/c/b/login/ ... 200 OK"));
    assert!(output.contains("/c/b/login/ ... 302 Found"));
    Ok(())
}

#[test]
fn test_login_as_another_user_fails() -> anyhow::Result<()> {
    let mut server = Server::new();
    let _mocks = mock_login(&mut server, "bob");
    let mut client = new_client(&server, profiles::staszic())?;
    let err = client
        .login(&mut credential("alice"), &mut credential("secret"))
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::LoginFailed));
    assert!(!client.is_logged_in());
    assert_eq!(client.username(), None);
    Ok(())
}

#[test]
fn test_login_page_without_form_fails() -> anyhow::Result<()> {
    let mut server = Server::new();
    let _home = server.mock("GET", "/").with_body(home_html(None)).create();
    let _login = server
        .mock("GET", "/c/b/login/")
        .with_body("<html><body>Maintenance</body></html>")
        .create();
    let post = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create();
    let mut client = new_client(&server, profiles::staszic())?;
    let err = client
        .login(&mut credential("alice"), &mut credential("secret"))
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PageNotLoaded));
    post.assert();
    Ok(())
}

#[test]
fn test_operations_require_login() -> anyhow::Result<()> {
    let mut server = Server::new();
    let any = server.mock("GET", Matcher::Any).expect(0).create();
    let mut client = new_client(&server, profiles::staszic())?;
    let contest = ContestId::from("b");
    let code = ProblemCode::from("a1");
    let file = tempfile::NamedTempFile::new()?;

    let errors = vec![
        client.list_contests().unwrap_err(),
        client.list_problems(&contest).unwrap_err(),
        client.get_problem_text(&contest, &code).unwrap_err(),
        client
            .submit_solution(&contest, &code, file.path())
            .unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), Some(ErrorKind::NotLoggedIn));
    }
    any.assert();
    Ok(())
}

#[test]
fn test_list_problems() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let page = server
        .mock("GET", "/c/b/p/")
        .with_body(PROBLEMS_HTML)
        .expect(1)
        .create();

    let problems = client.list_problems(&"b".into())?;
    assert_eq!(problems.len(), 2);
    let sum = &problems[&ProblemCode::from("a1")];
    assert_eq!(sum.name(), "Sum");
    assert_eq!(sum.score(), Some(100));
    assert_eq!(sum.extra("submits"), Some(Counter::Known(1)));
    assert_eq!(sum.extra("total_submits"), Some(Counter::Known(10)));
    let product = &problems[&ProblemCode::from("a12")];
    assert_eq!(product.score(), None);
    assert_eq!(client.profile().format_extras(product), "0 / 10");
    page.assert();
    Ok(())
}

#[test]
fn test_list_problems_fetches_limits() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let page = server
        .mock("GET", "/c/b/p/")
        .with_body(PROBLEMS_PLAIN_HTML)
        .expect(1)
        .create();
    let limits_1 = server
        .mock("GET", "/c/b/limits/1/")
        .with_body("1 / 10")
        .expect(1)
        .create();
    let limits_2 = server
        .mock("GET", "/c/b/limits/2/")
        .with_body("0 / 5\n")
        .expect(1)
        .create();

    let problems = client.list_problems(&"b".into())?;
    let codes: Vec<&str> = problems.keys().map(AsRef::as_ref).collect();
    assert_eq!(codes, vec!["a2", "a10"]);
    let sum = &problems[&ProblemCode::from("a10")];
    assert_eq!(sum.score(), Some(100));
    assert_eq!(sum.extra("submits"), Some(Counter::Known(1)));
    assert_eq!(sum.extra("total_submits"), Some(Counter::Known(10)));
    let difference = &problems[&ProblemCode::from("a2")];
    assert_eq!(client.profile().format_extras(difference), "0 / 5");
    page.assert();
    limits_1.assert();
    limits_2.assert();
    Ok(())
}

#[test]
fn test_list_problems_retries_empty_limits() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let page = server
        .mock("GET", "/c/b/p/")
        .with_body(PROBLEMS_PLAIN_HTML)
        .expect(3)
        .create();
    let limits = server
        .mock("GET", "/c/b/limits/2/")
        .with_body("")
        .expect(3)
        .create();

    let err = client.list_problems(&"b".into()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TooManyRetries));
    page.assert();
    limits.assert();
    Ok(())
}

#[test]
fn test_list_problems_stock_profile() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, Profile::parse("http://localhost")?)?;
    let _page = server
        .mock("GET", "/c/b/p/")
        .with_body(PROBLEMS_NOT_LOADED_HTML)
        .create();

    let problems = client.list_problems(&"b".into())?;
    let sum = &problems[&ProblemCode::from("a1")];
    assert_eq!(sum.score(), Some(100));
    assert!(sum.extras().is_empty());
    Ok(())
}

#[test]
fn test_list_problems_gives_up_when_stats_never_load() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let page = server
        .mock("GET", "/c/b/p/")
        .with_body(PROBLEMS_NOT_LOADED_HTML)
        .expect(3)
        .create();

    let err = client.list_problems(&"b".into()).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TooManyRetries));
    page.assert();
    Ok(())
}

#[test]
fn test_get_problem_text_returns_raw_response() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let _statement = server
        .mock("GET", "/c/b/p/a1/")
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.4")
        .create();
    let _missing = server
        .mock("GET", "/c/b/p/zz/")
        .with_status(404)
        .with_body("Not found")
        .create();

    let res = client.get_problem_text(&"b".into(), &"a1".into())?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/pdf");
    assert_eq!(res.bytes()?.as_ref(), b"%PDF-1.4");

    let res = client.get_problem_text(&"b".into(), &"zz".into())?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[test]
fn test_submit_solution() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let submit_url = format!("{}/c/b/submit/", server.url());
    let _page = server
        .mock("GET", "/c/b/submit/")
        .with_body(SUBMIT_HTML)
        .create();
    let post = server
        .mock("POST", "/c/b/submit/")
        .match_header("referer", submit_url.as_str())
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="csrfmiddlewaretoken"\r\n\r\ntok1\r\n"#.into()),
            Matcher::Regex(r#"name="problem_instance_id"\r\n\r\n12\r\n"#.into()),
            Matcher::Regex(r#"name="file"; filename="sum\.cpp""#.into()),
            Matcher::Regex("int main\\(\\) \\{\\}".into()),
        ]))
        .with_status(302)
        .with_header("location", "/c/b/submissions/")
        .expect(1)
        .create();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sum.cpp");
    std::fs::File::create(&path)?.write_all(b"int main() {}\n")?;

    let res = client.submit_solution(&"b".into(), &"a1".into(), &path)?;
    assert_eq!(res.status(), StatusCode::FOUND);
    post.assert();
    Ok(())
}

#[test]
fn test_submit_missing_file_sends_nothing() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let page = server.mock("GET", "/c/b/submit/").expect(0).create();
    let post = server.mock("POST", "/c/b/submit/").expect(0).create();

    let dir = tempfile::tempdir()?;
    let err = client
        .submit_solution(&"b".into(), &"a1".into(), &dir.path().join("missing.cpp"))
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::FileNotFound));
    page.assert();
    post.assert();
    Ok(())
}

#[test]
fn test_submit_unknown_problem() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, profiles::staszic())?;
    let _page = server
        .mock("GET", "/c/b/submit/")
        .with_body(SUBMIT_HTML)
        .create();
    let post = server.mock("POST", "/c/b/submit/").expect(0).create();
    let file = tempfile::NamedTempFile::new()?;

    let err = client
        .submit_solution(&"b".into(), &"2".into(), file.path())
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::ProblemNotFound));
    post.assert();
    Ok(())
}

#[test]
fn test_submit_page_without_button() -> anyhow::Result<()> {
    let mut server = Server::new();
    let (mut client, _mocks) = logged_in(&mut server, Profile::parse("http://localhost")?)?;
    // the stock profile only accepts "Submit"
    let _page = server
        .mock("GET", "/c/b/submit/")
        .with_body(SUBMIT_HTML)
        .create();
    let post = server.mock("POST", "/c/b/submit/").expect(0).create();
    let file = tempfile::NamedTempFile::new()?;

    let err = client
        .submit_solution(&"b".into(), &"a1".into(), file.path())
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PageNotLoaded));
    post.assert();
    Ok(())
}

#[test]
fn test_server_errors_are_retried() -> anyhow::Result<()> {
    let mut server = Server::new();
    let home = server
        .mock("GET", "/")
        .with_status(503)
        .expect(3)
        .create();
    let mut client = new_client(&server, profiles::staszic())?;
    let err = client
        .login(&mut credential("alice"), &mut credential("secret"))
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TooManyRetries));
    home.assert();
    Ok(())
}

#[test]
fn test_driver_connects_client() -> anyhow::Result<()> {
    let mut server = Server::new();
    let _mocks = mock_login(&mut server, "alice");
    let driver = Driver::http(profiles::staszic().with_base_url(server.url().parse()?));
    let cnsl = Console::buf(ConsoleConfig::default());
    let mut act = driver.open(&conf(), cnsl.clone())?;
    act.login(&mut credential("alice"), &mut credential("secret"))?;
    assert_eq!(act.username(), Some("alice"));
    assert!(cnsl.take_output()?.contains("/c/b/login/ ... 302 Found"));
    Ok(())
}
