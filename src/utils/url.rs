//! Joining configured base URLs with endpoint paths.

/// Strip trailing slashes so endpoint joins never produce `//`.
///
/// ```
/// use tutorlens::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Append `endpoint` to `base_url` with exactly one slash between them.
///
/// ```
/// use tutorlens::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("http://localhost:8000/", "/api/llm_response"),
///     "http://localhost:8000/api/llm_response"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_repeated_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://tutor.example.dev///"),
            "https://tutor.example.dev"
        );
        assert_eq!(
            normalize_base_url(" https://tutor.example.dev "),
            "https://tutor.example.dev"
        );
    }

    #[test]
    fn joins_backend_endpoints() {
        assert_eq!(
            construct_api_url("http://localhost:8080", "generate-video"),
            "http://localhost:8080/generate-video"
        );
        assert_eq!(
            construct_api_url("https://tunnel.example.dev/prefix/", "api/set-subject"),
            "https://tunnel.example.dev/prefix/api/set-subject"
        );
    }
}
