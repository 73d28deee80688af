//! Sign-in handshake with Our Groceries.
//!
//! The service has no public API. A browser-style form post returns a
//! session cookie, and the lists page embeds the team id that every
//! command must carry.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode, redirect};
use tracing::{debug, info};

use crate::consts::{AUTH_COOKIE, BASE_URL, LISTS_PATH, SIGN_IN_PATH, USER_AGENT, url};

static TEAM_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"var g_teamId = "([^"]+)""#).expect("team id pattern is valid")
});

/// An authenticated session: the auth cookie plus the account's team id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub cookie: String,
    pub team_id: String,
}

impl Session {
    /// Attach the session cookie and the headers the service expects.
    pub fn authorize(&self, request: RequestBuilder, referer: &str) -> RequestBuilder {
        browser_headers(request, referer).header(COOKIE, format!("{AUTH_COOKIE}={}", self.cookie))
    }
}

/// HTTP client for talking to Our Groceries. Redirects are not followed:
/// the sign-in response is a 302 whose cookie we need to read.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

/// Sign in with email and password and discover the team id.
pub async fn sign_in(http: &Client, username: &str, password: &str) -> Result<Session> {
    let form = [
        ("emailAddress", username),
        ("password", password),
        ("action", "sign-me-in"),
        ("staySignedIn", "on"),
    ];
    let body = form
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoded(v)))
        .collect::<Vec<_>>()
        .join("&");

    let request = http
        .post(url(SIGN_IN_PATH))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body);
    let resp = browser_headers(request, &url(SIGN_IN_PATH))
        .send()
        .await
        .context("sign-in request failed")?;

    if resp.status() != StatusCode::FOUND {
        bail!(
            "sign-in rejected (status {}), check the account credentials",
            resp.status()
        );
    }

    let set_cookies = resp
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok());
    let Some(cookie) = cookie_value(set_cookies, AUTH_COOKIE) else {
        bail!("sign-in response did not set the {AUTH_COOKIE} cookie");
    };
    debug!("received session cookie");

    let partial = Session {
        cookie,
        team_id: String::new(),
    };
    let page = partial
        .authorize(http.get(url(LISTS_PATH)), &url(LISTS_PATH))
        .send()
        .await
        .context("failed to load the lists page")?
        .text()
        .await
        .context("failed to read the lists page")?;

    let Some(team_id) = extract_team_id(&page) else {
        bail!("could not find the team id on the lists page");
    };
    info!("signed in to Our Groceries as {username}");

    Ok(Session { team_id, ..partial })
}

/// Pull the team id out of the lists page markup.
pub fn extract_team_id(page: &str) -> Option<String> {
    TEAM_ID.captures(page).map(|caps| caps[1].to_string())
}

/// Find a cookie's value among `Set-Cookie` header values.
pub fn cookie_value<'a>(
    set_cookies: impl IntoIterator<Item = &'a str>,
    name: &str,
) -> Option<String> {
    set_cookies.into_iter().find_map(|header| {
        let pair = header.split(';').next()?;
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

fn browser_headers(request: RequestBuilder, referer: &str) -> RequestBuilder {
    request
        .header("User-Agent", USER_AGENT)
        .header("Referer", referer)
        .header("Origin", BASE_URL)
}

/// Minimal URL encoding for form values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_id_is_extracted() {
        let page = r#"<script>var g_teamId = "abc123XYZ";var other = 1;</script>"#;
        assert_eq!(extract_team_id(page).as_deref(), Some("abc123XYZ"));
    }

    #[test]
    fn team_id_missing() {
        assert_eq!(extract_team_id("<html>sign in again</html>"), None);
    }

    #[test]
    fn cookie_found_among_several() {
        let headers = [
            "JSESSIONID=xyz; Path=/",
            "ourgroceries-auth=secret-token; Expires=Wed, 21 Oct 2026 07:28:00 GMT; Path=/",
        ];
        assert_eq!(
            cookie_value(headers, AUTH_COOKIE).as_deref(),
            Some("secret-token")
        );
    }

    #[test]
    fn cookie_absent() {
        assert_eq!(cookie_value(["other=1"], AUTH_COOKIE), None);
    }

    #[test]
    fn form_values_are_encoded() {
        assert_eq!(urlencoded("me+you@example.com"), "me%2Byou%40example.com");
        assert_eq!(urlencoded("p@ss word"), "p%40ss%20word");
    }
}
