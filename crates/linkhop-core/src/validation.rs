use crate::error::{CoreError, Result};
use url::Url;

/// Longest custom alias accepted by [`validate_short_code`].
pub const MAX_SHORT_CODE_LEN: usize = 50;

/// Checks that `raw` is an absolute `http` or `https` URL with a host.
///
/// Rules apply in order: parse failure, then scheme, then host. The host
/// must come from an explicit `//authority` in the input, so forms that a
/// WHATWG parser would repair (`http:example.com`, `http:///example.com`)
/// are rejected. The URL is not normalised; path, query and fragment are
/// accepted as-is.
pub fn validate_url(raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(CoreError::EmptyUrl);
    }

    let input = raw.trim_matches(|c: char| c.is_ascii_control() || c == ' ');
    let parsed = match Url::parse(input) {
        Ok(parsed) => Some(parsed),
        // Scheme is still checked before reporting the missing host.
        Err(url::ParseError::EmptyHost) => None,
        Err(e) => return Err(CoreError::InvalidUrl(format!("parse failure: {e}"))),
    };

    let scheme = match &parsed {
        Some(url) => url.scheme().to_owned(),
        None => scheme_prefix(input),
    };
    if !matches!(scheme.as_str(), "http" | "https") {
        return Err(CoreError::InvalidUrl(format!(
            "unsupported scheme: {scheme}"
        )));
    }

    let has_host = parsed
        .as_ref()
        .and_then(Url::host_str)
        .is_some_and(|host| !host.is_empty());
    if !has_host || !has_authority(input) {
        return Err(CoreError::InvalidUrl("missing host".to_string()));
    }

    Ok(())
}

fn scheme_prefix(input: &str) -> String {
    input
        .split_once(':')
        .map_or("", |(scheme, _)| scheme)
        .to_ascii_lowercase()
}

/// `scheme://[userinfo@]host...` with a non-empty host part.
fn has_authority(input: &str) -> bool {
    let Some(rest) = input
        .split_once(':')
        .and_then(|(_, rest)| rest.strip_prefix("//"))
    else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    !host.is_empty()
}

/// Checks a caller-supplied alias against `[A-Za-z0-9_-]{1,50}`.
pub fn validate_short_code(code: &str) -> Result<()> {
    if code.is_empty() {
        return Err(CoreError::InvalidShortCode(
            "short code cannot be empty".to_string(),
        ));
    }

    if code.len() > MAX_SHORT_CODE_LEN {
        return Err(CoreError::ShortCodeTooLong {
            len: code.len(),
            max: MAX_SHORT_CODE_LEN,
        });
    }

    if !code.bytes().all(is_alphabet_byte) {
        return Err(CoreError::InvalidShortCode(format!(
            "must contain only letters, digits, hyphens or underscores: '{code}'"
        )));
    }

    Ok(())
}

fn is_alphabet_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("https://example.com/a/b?q=1#frag").is_ok());
        assert!(validate_url("https://sub.example.com:8443/path").is_ok());
    }

    #[test]
    fn rejects_empty_url() {
        assert_eq!(validate_url(""), Err(CoreError::EmptyUrl));
    }

    #[test]
    fn rejects_unparsable_url() {
        let err = validate_url("not a url").unwrap_err();
        assert!(matches!(err, CoreError::InvalidUrl(reason) if reason.starts_with("parse failure")));
    }

    #[test]
    fn rejects_other_schemes() {
        for raw in ["ftp://example.com", "mailto:user@example.com", "javascript:alert(1)"] {
            let err = validate_url(raw).unwrap_err();
            assert!(
                matches!(&err, CoreError::InvalidUrl(reason) if reason.starts_with("unsupported scheme")),
                "{raw}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_missing_host() {
        let err = validate_url("http://").unwrap_err();
        assert_eq!(err, CoreError::InvalidUrl("missing host".to_string()));
    }

    #[test]
    fn rejects_host_the_parser_would_repair() {
        for raw in [
            "http:///example.com",
            "http:example.com",
            "https:/example.com",
            "http://user@/path",
        ] {
            assert_eq!(
                validate_url(raw),
                Err(CoreError::InvalidUrl("missing host".to_string())),
                "{raw}"
            );
        }
    }

    #[test]
    fn scheme_is_checked_before_host() {
        let err = validate_url("ftp://").unwrap_err();
        assert!(
            matches!(&err, CoreError::InvalidUrl(reason) if reason == "unsupported scheme: ftp"),
            "{err:?}"
        );
    }

    #[test]
    fn accepts_userinfo_and_uppercase_scheme() {
        assert!(validate_url("https://user:pw@example.com/x").is_ok());
        assert!(validate_url("HTTPS://example.com").is_ok());
    }

    #[test]
    fn accepts_aliases_in_alphabet() {
        assert!(validate_short_code("a").is_ok());
        assert!(validate_short_code("Abc-123_xyz").is_ok());
        assert!(validate_short_code(&"z".repeat(MAX_SHORT_CODE_LEN)).is_ok());
    }

    #[test]
    fn rejects_empty_alias() {
        assert!(matches!(
            validate_short_code(""),
            Err(CoreError::InvalidShortCode(_))
        ));
    }

    #[test]
    fn rejects_long_alias() {
        let err = validate_short_code(&"a".repeat(MAX_SHORT_CODE_LEN + 1)).unwrap_err();
        assert_eq!(err, CoreError::ShortCodeTooLong { len: 51, max: 50 });
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        for code in ["abc def", "abc/def", "abc!def", "abc.def", "caf\u{e9}", "a+b", "a=b"] {
            assert!(
                matches!(validate_short_code(code), Err(CoreError::InvalidShortCode(_))),
                "{code} should be rejected"
            );
        }
    }
}
