//! Per-browsing-session "intro already shown" flag, carried in a cookie.

use axum::http::{header, HeaderMap};

pub const INTRO_COOKIE: &str = "intro_shown";

/// Session cookie (no `Max-Age`), so the intro plays once per browser session.
pub const SET_INTRO_COOKIE: &str = "intro_shown=1; Path=/; SameSite=Lax";

pub const BOOT_LINES: &[(&str, &str)] = &[
    ("Loading kernel modules...", "OK"),
    ("Mounting virtual file systems...", "OK"),
    ("Initializing graphics adapter...", "OK"),
    ("Starting Network Manager...", "OK"),
    ("Compiling shaders...", "OK"),
    ("Hydrating DOM...", "OK"),
    ("System Ready.", "SUCCESS"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntroSession {
    pub intro_shown: bool,
}

impl IntroSession {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let intro_shown = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(name, value)| name == INTRO_COOKIE && value == "1");
        Self { intro_shown }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_flag_from_cookie_header() {
        let mut headers = HeaderMap::new();
        assert!(!IntroSession::from_headers(&headers).intro_shown);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; intro_shown=1"));
        assert!(IntroSession::from_headers(&headers).intro_shown);

        headers.insert(header::COOKIE, HeaderValue::from_static("intro_shown=0"));
        assert!(!IntroSession::from_headers(&headers).intro_shown);
    }
}
