use std::sync::OnceLock;
use url::Url;

static EMAIL_RE: OnceLock<regex::Regex> = OnceLock::new();

/// Lowercase and trim an email address before lookups and storage.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal email shape check, one `@` with a dot in the domain part.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    let re = EMAIL_RE.get_or_init(|| {
        regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
    });
    re.is_match(email)
}

/// Password policy: at least 8 characters with upper, lower, digit and symbol.
#[must_use]
pub fn strong_password(password: &str) -> bool {
    let long_enough = password.chars().count() >= 8;
    let upper = password.chars().any(char::is_uppercase);
    let lower = password.chars().any(char::is_lowercase);
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password.chars().any(|c| !c.is_alphanumeric());

    long_enough && upper && lower && digit && symbol
}

/// Build the email confirmation link, email and token go in the query string.
///
/// # Errors
///
/// Returns an error if the base URL cannot be parsed.
pub fn build_confirm_email_url(base_url: &str, email: &str, token: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(base_url)?.join("auth/confirmemail")?;
    url.query_pairs_mut()
        .append_pair("email", email)
        .append_pair("token", token);
    Ok(url.to_string())
}

/// Build the password reset link served by the frontend.
#[must_use]
pub fn build_reset_url(base_url: &str, id: &str, token: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/auth/reset-password/{id}/{token}")
}

/// Wire representation of the verified flag.
#[must_use]
pub const fn verified_label(verified: bool) -> &'static str {
    if verified {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Nurse@Clinic.EXAMPLE "), "nurse@clinic.example");
    }

    #[test]
    fn email_validation() {
        assert!(valid_email("doctor@clinic.example"));
        assert!(valid_email("a.b+c@sub.domain.org"));
        assert!(!valid_email("doctor@clinic"));
        assert!(!valid_email("doctor clinic@x.y"));
        assert!(!valid_email("@clinic.example"));
        assert!(!valid_email(""));
    }

    #[test]
    fn password_policy() {
        assert!(strong_password("Str0ng!pass"));
        assert!(!strong_password("Sh0r!t"));
        assert!(!strong_password("alllower1!"));
        assert!(!strong_password("ALLUPPER1!"));
        assert!(!strong_password("NoDigits!!"));
        assert!(!strong_password("NoSymbol123"));
    }

    #[test]
    fn confirm_email_url_encodes_query() {
        let url = build_confirm_email_url(
            "http://localhost:3000/",
            "nurse+oncall@clinic.example",
            "a.b+c/d",
        )
        .unwrap();
        assert!(url.starts_with("http://localhost:3000/auth/confirmemail?"));
        assert!(url.contains("email=nurse%2Boncall%40clinic.example"));
        assert!(url.contains("token=a.b%2Bc%2Fd"));
    }

    #[test]
    fn reset_url_shape() {
        let url = build_reset_url("http://localhost:3000/", "abc", "tok");
        assert_eq!(url, "http://localhost:3000/auth/reset-password/abc/tok");
    }

    #[test]
    fn verified_labels() {
        assert_eq!(verified_label(true), "true");
        assert_eq!(verified_label(false), "false");
    }
}
