use regex::Regex;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(http://www\.|https://www\.|http://|https://)?[a-z0-9]+([\-.][a-z0-9]+)*\.[a-z]{2,5}(:[0-9]{1,5})?(/.*)?$",
    )
    .expect("url pattern")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("email pattern")
});

const PASSWORD_SPECIALS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*'];

/// Loose website check for user-entered links. Blank input counts as valid.
pub fn test_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return true;
    }
    URL_RE.is_match(&url.to_lowercase())
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// At least 8 characters on one line, with a digit, a lowercase letter and one of `!@#$%^&*`.
pub fn validate_password(pwd: &str) -> bool {
    // Length in UTF-16 units, as browsers count it.
    pwd.encode_utf16().count() >= 8
        && !pwd.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
        && pwd.chars().any(|c| c.is_ascii_digit())
        && pwd.contains(PASSWORD_SPECIALS)
        && pwd.chars().any(|c| c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        assert!(test_url(""));
        assert!(test_url("   "));
        assert!(test_url("example.com"));
        assert!(test_url("  HTTPS://www.Example.co.uk:8080/path?q=1 "));
        assert!(test_url("sub-domain.example.io/"));
        assert!(!test_url("example"));
        assert!(!test_url("ftp://example.com"));
        assert!(!test_url("example.toolongtld"));
    }

    #[test]
    fn emails() {
        assert!(validate_email("jane.doe@example.com"));
        assert!(validate_email("\"odd name\"@example.org"));
        assert!(validate_email("ops@[10.0.0.1]"));
        assert!(!validate_email("jane@localhost"));
        assert!(!validate_email("jane doe@example.com"));
        assert!(!validate_email("@example.com"));
    }

    #[test]
    fn passwords() {
        assert!(validate_password("secret1!"));
        assert!(validate_password("ABCdef9#"));
        assert!(!validate_password("short1!"));
        assert!(!validate_password("nodigits!!"));
        assert!(!validate_password("nospecial12"));
        assert!(!validate_password("UPPER123!"));
        assert!(!validate_password("line1!\nbreak"));
        // Six chars, but each emoji is two UTF-16 units.
        assert!(validate_password("a1!\u{1F600}\u{1F600}\u{1F600}"));
        assert!(!validate_password("a1!\u{e9}\u{e9}\u{e9}\u{e9}"));
    }
}
