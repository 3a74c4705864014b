//! Path and URL helpers used to resolve `sources` against `sourceRoot`.

use once_cell::sync::Lazy;
use regex::Regex;

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([\w+\-.]+):)?//(?:(\w+:\w+)@)?([\w.]*)(?::(\d+))?(\S*)$")
        .expect("valid url regex")
});
static DATA_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:.+,.+$").expect("valid data url regex"));
static SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/+").expect("valid slashes regex"));

/// The parts of a `scheme://auth@host:port/path` URL. Empty parts are `None`.
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct Url {
    pub scheme: Option<String>,
    pub auth: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub path: Option<String>,
}

impl Url {
    /// Parses `url`, returning `None` when it is not of the form `[scheme:]//...`.
    pub fn parse(url: &str) -> Option<Self> {
        let captures = URL.captures(url)?;
        let part = |idx| {
            captures
                .get(idx)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Some(Self {
            scheme: part(1),
            auth: part(2),
            host: part(3),
            port: part(4),
            path: part(5),
        })
    }

    /// Reassembles the URL from its parts.
    pub fn generate(&self) -> String {
        let mut url = String::new();
        if let Some(scheme) = &self.scheme {
            url.push_str(scheme);
            url.push(':');
        }
        url.push_str("//");
        if let Some(auth) = &self.auth {
            url.push_str(auth);
            url.push('@');
        }
        if let Some(host) = &self.host {
            url.push_str(host);
        }
        if let Some(port) = &self.port {
            url.push(':');
            url.push_str(port);
        }
        if let Some(path) = &self.path {
            url.push_str(path);
        }
        url
    }
}

pub fn is_data_url(s: &str) -> bool {
    DATA_URL.is_match(s)
}

/// Normalizes a path, or the path portion of a URL: collapses repeated slashes, drops `.`
/// segments and resolves `<dir>/..` pairs.
pub fn normalize(path: &str) -> String {
    let mut url = Url::parse(path);
    let path = match &url {
        Some(Url { path: None, .. }) => return path.to_owned(),
        Some(Url { path: Some(p), .. }) => p.as_str(),
        None => path,
    };
    let is_absolute = path.starts_with('/');

    let mut parts: Vec<&str> = SLASHES.split(path).collect();
    let mut up = 0usize;
    let mut idx = parts.len();
    while idx > 0 {
        idx -= 1;
        match parts[idx] {
            "." => {
                parts.remove(idx);
            }
            ".." => up += 1,
            // the first part is blank for absolute paths, there is nothing above the root
            "" if up > 0 => {
                let end = (idx + 1 + up).min(parts.len());
                parts.drain(idx + 1..end);
                up = 0;
            }
            _ if up > 0 => {
                let end = (idx + 2).min(parts.len());
                parts.drain(idx..end);
                up -= 1;
            }
            _ => {}
        }
    }

    let mut normalized = parts.join("/");
    if normalized.is_empty() {
        normalized = if is_absolute { "/" } else { "." }.to_owned();
    }

    match url.as_mut() {
        Some(url) => {
            url.path = Some(normalized);
            url.generate()
        }
        None => normalized,
    }
}

/// Joins `path` onto `root`.
///
/// - A URL or data URI `path` is returned as is, except that a scheme-relative URL takes the
///   scheme of `root`.
/// - Otherwise an absolute `path` replaces the path of `root`, and a relative one is appended to
///   it and normalized. When `root` is a URL only its path portion is changed.
pub fn join(root: &str, path: &str) -> String {
    let root = if root.is_empty() { "." } else { root };
    let path = if path.is_empty() { "." } else { path };

    let root_url = Url::parse(root);
    if let Some(mut path_url) = Url::parse(path) {
        if path_url.scheme.is_none() {
            path_url.scheme = root_url.and_then(|url| url.scheme);
            return path_url.generate();
        }
        return path.to_owned();
    }
    if is_data_url(path) {
        return path.to_owned();
    }

    let Some(mut root_url) = root_url else {
        return join_paths(root, path);
    };
    if root_url.host.is_none() && root_url.path.is_none() {
        root_url.host = Some(path.to_owned());
        return root_url.generate();
    }
    let joined = join_paths(root_url.path.as_deref().unwrap_or("/"), path);
    root_url.path = Some(joined);
    root_url.generate()
}

fn join_paths(root: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        normalize(&format!("{}/{}", root.trim_end_matches('/'), path))
    }
}

/// Makes `path` relative to `root` when it lies beneath it, otherwise returns it unchanged.
pub fn relative<'a>(root: &str, path: &'a str) -> &'a str {
    let root = if root.is_empty() { "." } else { root };
    let root = root.strip_suffix('/').unwrap_or(root);

    if path.starts_with('/') {
        if let Some(url) = Url::parse(root) {
            if url.path.as_deref() == Some("/") {
                return &path[1..];
            }
        }
    }

    path.strip_prefix(root)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

/// Splits `s` after `units` UTF-16 code units. A split falling inside a surrogate pair keeps the
/// whole character on the left; `units` past the end returns `(s, "")`.
pub(crate) fn split_at_utf16(s: &str, units: usize) -> (&str, &str) {
    let mut seen = 0;
    for (offset, ch) in s.char_indices() {
        if seen >= units {
            return s.split_at(offset);
        }
        seen += ch.len_utf16();
    }
    (s, "")
}

#[inline]
pub(crate) fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}
