//! Path helpers for locating Folio's data directory.
//!
//! These are the only functions in the crate that read process environment
//! variables. Everything else receives paths through an
//! [`Environment`](super::Environment).

use std::path::PathBuf;

/// Name of the per-user directory holding service data and trace files.
const APP_DIR: &str = "folio";

/// Returns the default data directory.
///
/// Resolution order: `$XDG_DATA_HOME/folio`, then `$HOME/.local/share/folio`,
/// then `./.folio` when neither variable is set.
///
/// # Examples
///
/// ```
/// use folio::infrastructure::default_data_dir;
///
/// let dir = default_data_dir();
/// assert!(dir.ends_with("folio") || dir.ends_with(".folio"));
/// ```
#[must_use]
pub fn default_data_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(
            || PathBuf::from(format!(".{APP_DIR}")),
            |home| PathBuf::from(home).join(".local").join("share").join(APP_DIR),
        )
}

/// Expands a leading `~` to the given home directory.
///
/// # Examples
///
/// ```
/// use folio::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("~/data", "/home/ann"), "/home/ann/data");
/// assert_eq!(expand_tilde("~", "/home/ann"), "/home/ann");
/// assert_eq!(expand_tilde("/var/lib/folio", "/home/ann"), "/var/lib/folio");
/// ```
#[must_use]
pub fn expand_tilde(path: &str, home: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        format!("{}/{rest}", home.trim_end_matches('/'))
    } else if path == "~" {
        home.to_string()
    } else {
        path.to_string()
    }
}

/// Expands a leading `~` using `$HOME`, leaving the path untouched if unset.
#[must_use]
pub fn expand_home(path: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(expand_tilde(path, &home)),
        _ => PathBuf::from(path),
    }
}
