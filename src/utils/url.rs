//! Helpers for joining the configured API base URL with endpoint paths.

/// Strip trailing slashes so endpoint joins never produce `//`.
///
/// ```
/// use minimind_chat::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:5000/api/"), "http://localhost:5000/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash between them.
///
/// ```
/// use minimind_chat::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:5000/api/", "/login"),
///     "http://localhost:5000/api/login"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalize_base_url(base_url), endpoint)
}

/// Check that a user-supplied base URL is an absolute http(s) URL.
pub fn validate_base_url(base_url: &str) -> Result<String, String> {
    let normalized = normalize_base_url(base_url);
    let parsed = reqwest::Url::parse(&normalized)
        .map_err(|err| format!("Invalid API URL '{base_url}': {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(normalized),
        other => Err(format!(
            "Invalid API URL '{base_url}': unsupported scheme '{other}'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_every_trailing_slash() {
        assert_eq!(
            normalize_base_url("http://localhost:5000/api"),
            "http://localhost:5000/api"
        );
        assert_eq!(
            normalize_base_url("http://localhost:5000/api///"),
            "http://localhost:5000/api"
        );
        assert_eq!(normalize_base_url("  http://h/  "), "http://h");
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_with_single_slash() {
        for base in ["http://h:5000/api", "http://h:5000/api/"] {
            for endpoint in ["history", "/history", "///history"] {
                assert_eq!(
                    construct_api_url(base, endpoint),
                    "http://h:5000/api/history"
                );
            }
        }
    }

    #[test]
    fn validate_accepts_http_and_rejects_other_schemes() {
        assert_eq!(
            validate_base_url("https://chat.example.org/api/").as_deref(),
            Ok("https://chat.example.org/api")
        );
        assert!(validate_base_url("ftp://chat.example.org").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}
