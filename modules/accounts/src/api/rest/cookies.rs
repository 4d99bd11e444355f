use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// Writes the session cookie with the configured attributes.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    secure: bool,
    same_site_none: bool,
    max_age_seconds: i64,
}

impl SessionCookies {
    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self {
            name: cfg.cookie_name.clone(),
            secure: cfg.secure,
            same_site_none: cfg.same_site_cross_origin,
            max_age_seconds: cfg.max_age_seconds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying a fresh session token.
    pub fn issue(&self, token: &str) -> Result<HeaderValue, header::InvalidHeaderValue> {
        HeaderValue::from_str(&self.render(token, self.max_age_seconds))
    }

    /// `Set-Cookie` value that expires the session cookie.
    pub fn clear(&self) -> Result<HeaderValue, header::InvalidHeaderValue> {
        HeaderValue::from_str(&self.render("", 0))
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let same_site = if self.same_site_none { "None" } else { "Lax" };
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
            self.name, value, max_age, same_site
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Session token from the request: the named cookie first, then `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_value(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == cookie_name && !v.is_empty())
        .map(|(_, v)| v.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies(secure: bool, cross: bool) -> SessionCookies {
        SessionCookies::from_config(&SessionConfig {
            secure,
            same_site_cross_origin: cross,
            max_age_seconds: 60,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn local_cookie_is_lax_and_not_secure() {
        let v = cookies(false, false).issue("abc").unwrap();
        assert_eq!(
            v.to_str().unwrap(),
            "token=abc; Path=/; Max-Age=60; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn cross_origin_cookie_is_none_and_secure() {
        let v = cookies(true, true).issue("abc").unwrap();
        let s = v.to_str().unwrap();
        assert!(s.contains("SameSite=None"));
        assert!(s.ends_with("; Secure"));
    }

    #[test]
    fn clearing_keeps_attributes_and_zeroes_max_age() {
        let v = cookies(true, true).clear().unwrap();
        assert_eq!(
            v.to_str().unwrap(),
            "token=; Path=/; Max-Age=0; HttpOnly; SameSite=None; Secure"
        );
    }

    #[test]
    fn cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers, "token").as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_is_used_without_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(token_from_headers(&headers, "token").as_deref(), Some("xyz"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(token_from_headers(&headers, "token"), None);
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(token_from_headers(&headers, "token"), None);
    }
}
