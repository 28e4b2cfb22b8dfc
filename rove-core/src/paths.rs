//! Path normalization for configured folders and pins
//!
//! Expands `$VAR`/`${VAR}` references and a leading `~`, then cleans the
//! result lexically. Only [`canonical`] touches the filesystem.

use std::env;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{Error, Result};

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("Invalid env var pattern")
});

/// Expand environment variables, a leading `~` and clean the path
///
/// Unset variables expand to the empty string.
pub fn normalize(raw: &str) -> Result<PathBuf> {
    let expanded = expand_env_vars(raw);
    let expanded = expand_tilde(&expanded)?;
    Ok(clean(Path::new(&expanded)))
}

/// Normalize and anchor a relative result at `base`
pub fn normalize_from(raw: &str, base: &Path) -> Result<PathBuf> {
    let path = normalize(raw)?;
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(clean(&base.join(path)))
    }
}

/// Replace `${VAR}` and `$VAR` with their values
pub fn expand_env_vars(s: &str) -> String {
    ENV_VAR
        .replace_all(s, |caps: &Captures| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            env::var(name).unwrap_or_default()
        })
        .into_owned()
}

/// Replace a leading `~` with the home directory
pub fn expand_tilde(path: &str) -> Result<String> {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
            Ok(format!("{}{}", home.display(), rest))
        }
        None => Ok(path.to_string()),
    }
}

/// Lexically clean a path: drop `.`, fold `..` and trailing separators
///
/// `..` directly under the root stays at the root; leading `..` of a relative
/// path are kept.
pub fn clean(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }

    out.iter().collect()
}

/// Physical location of a path, symlinks resolved
///
/// Falls back to the lexically cleaned path when the target does not exist
/// or cannot be resolved, so comparisons still work for stale entries.
pub fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .map(|p| clean(&p))
        .unwrap_or_else(|_| clean(path))
}
