//! Credential redaction for anything that may reach a log line or an error.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Literal written in place of both the user and the password.
pub const MASK: &str = "******";

// `scheme://user:password@` anywhere in a piece of text. The password may
// itself contain `@`; the greedy match stops at the last one before a `/`.
static USERINFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*://)[^\s:/@'"]+:[^\s/'"]+@"#)
        .expect("userinfo pattern is valid")
});

// A whole string that is a URL carrying a non-empty user and password.
static SECRET_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]+://)[^:]+:[^@]+(@.+)$").expect("secret url pattern is valid")
});

/// Mask every `user:password@` pair embedded in `text`.
///
/// Applying it to already-redacted text is a no-op.
pub fn de_secret(text: &str) -> Cow<'_, str> {
    USERINFO.replace_all(text, format!("${{scheme}}{MASK}:{MASK}@").as_str())
}

/// Redact a list of command arguments.
pub fn de_secret_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    args.iter()
        .map(|arg| de_secret(arg.as_ref()).into_owned())
        .collect()
}

/// Whether `url` is a URL with both a user and a password filled in.
pub fn is_secret_url(url: &str) -> bool {
    SECRET_URL.is_match(url)
}
