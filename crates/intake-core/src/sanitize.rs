//! Input sanitizers for form fields.
//!
//! `sanitize_text_field` neutralizes markup in single-line text and
//! `sanitize_email` reduces an address to an email-shaped string, or to the
//! empty string when no such shape can be recovered.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>")
        .expect("valid script/style pattern")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>").expect("valid tag pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid whitespace pattern"));

static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("valid octet pattern"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("valid space pattern"));

/// Strip tags, encode stray `<`, collapse whitespace and drop
/// percent-encoded octets.
pub fn sanitize_text_field(input: &str) -> String {
    let mut filtered = input.to_string();

    if filtered.contains('<') {
        filtered = SCRIPT_OR_STYLE.replace_all(&filtered, "").into_owned();
        filtered = TAG.replace_all(&filtered, "").into_owned();
        filtered = filtered.replace('<', "&lt;");
    }

    filtered = WHITESPACE_RUN.replace_all(&filtered, " ").trim().to_string();

    let mut found = false;
    while PERCENT_OCTET.is_match(&filtered) {
        filtered = PERCENT_OCTET.replace_all(&filtered, "").into_owned();
        found = true;
    }
    if found {
        filtered = SPACE_RUN.replace_all(&filtered, " ").trim().to_string();
    }

    filtered
}

const EMAIL_MIN_LEN: usize = 6;

fn is_local_part_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c)
}

fn is_outer_trim_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\0' | '\x0B')
}

/// Reduce `input` to `local@domain` form. Returns an empty string when
/// the input cannot be made email shaped.
pub fn sanitize_email(input: &str) -> String {
    let email = input.trim();
    if email.len() < EMAIL_MIN_LEN {
        return String::new();
    }

    let Some((local, domain)) = email.split_once('@') else {
        return String::new();
    };

    let local: String = local.chars().filter(|c| is_local_part_char(*c)).collect();
    if local.is_empty() {
        return String::new();
    }

    let domain = collapse_dot_runs(domain);
    let domain = domain.trim_matches(|c: char| is_outer_trim_char(c) || c == '.');
    if domain.is_empty() {
        return String::new();
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return String::new();
    }

    let labels: Vec<String> = labels
        .into_iter()
        .map(|label| {
            label
                .trim_matches(|c: char| is_outer_trim_char(c) || c == '-')
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|label| !label.is_empty())
        .collect();
    if labels.len() < 2 {
        return String::new();
    }

    format!("{local}@{}", labels.join("."))
}

/// Remove every run of two or more dots entirely.
fn collapse_dot_runs(domain: &str) -> String {
    let mut out = String::with_capacity(domain.len());
    let mut chars = domain.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '.' {
            out.push(c);
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&'.') {
            chars.next();
            run += 1;
        }
        if run == 1 {
            out.push('.');
        }
    }
    out
}
