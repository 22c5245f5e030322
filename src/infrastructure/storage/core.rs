use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const MAX_NAME_BYTES: usize = 100;

/// Makes a client-supplied filename safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let mut s = WHITESPACE_RE.replace_all(name.trim(), "_").into_owned();
    let invalid = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];
    for ch in invalid {
        s = s.replace(ch, "-");
    }
    let s = s.trim_start_matches('.');
    let mut s = s.to_string();
    if s.len() > MAX_NAME_BYTES {
        let mut cut = MAX_NAME_BYTES;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    if s.is_empty() {
        s = "file".into();
    }
    s
}

/// `<millis>-<sanitized>`, or `<millis>-<n>-<sanitized>` when a discriminator is needed.
pub fn storage_name(ts_millis: i64, original: &str, discriminator: u32) -> String {
    let safe = sanitize_filename(original);
    if discriminator == 0 {
        format!("{ts_millis}-{safe}")
    } else {
        format!("{ts_millis}-{discriminator}-{safe}")
    }
}

/// True when `name` is exactly one normal path component without NUL bytes.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\', '\0'])
}
