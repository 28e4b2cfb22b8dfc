//! Remote URL normalization
//!
//! A repository's identifier is the `host/owner/repo` form of its `origin`
//! URL. The same remote cloned to different local paths yields the same
//! identifier, which is what makes per-repository branch pins portable.

/// Normalize a git remote URL to `host/owner/repo`
///
/// Supports:
/// - `git@github.com:owner/repo(.git)`
/// - `ssh://git@github.com/owner/repo(.git)`
/// - `https://github.com/owner/repo(.git)`
/// - `http://github.com/owner/repo(.git)`
///
/// Returns an empty string for anything else, including input that is
/// already normalized. Callers fall back to the repository path then.
pub fn normalize_remote_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let url = url.strip_suffix(".git").unwrap_or(url);

    // git@github.com:owner/repo
    if let Some(rest) = url.strip_prefix("git@") {
        return rest.replacen(':', "/", 1);
    }

    // ssh://git@github.com/owner/repo
    if let Some(rest) = url.strip_prefix("ssh://") {
        return rest.strip_prefix("git@").unwrap_or(rest).to_string();
    }

    if let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    {
        return rest.to_string();
    }

    String::new()
}
