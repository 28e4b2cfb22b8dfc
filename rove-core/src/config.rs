//! Configuration management for rove
//!
//! The configuration file is located with the following priority:
//! 1. An explicit path (CLI `--config` or `ROVE_CONFIG`)
//! 2. `.rove.yaml` in the current directory
//! 3. `.rove.yaml` in the home directory
//!
//! When no file exists the defaults apply and the home directory location
//! becomes the save target. There is no locking: two processes saving at
//! the same time race and the last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::paths;
use crate::{Error, Result};

/// Config file name looked up in the current and home directories
pub const CONFIG_FILE_NAME: &str = ".rove.yaml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ROVE_CONFIG";

/// Persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Folders searched for repositories, in order
    pub search_folders: Vec<String>,

    /// Repository paths floated to the top of results, highest priority first
    pub pinned_repos: Vec<String>,

    /// Branch names protected in every repository
    pub pinned_branches: Vec<String>,

    /// Branch names protected per repository identifier
    #[serde(deserialize_with = "deserialize_repo_pins")]
    pub repo_pinned_branches: BTreeMap<String, Vec<String>>,

    /// Short names expanding to a path or search query
    pub aliases: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_folders: vec!["~/".to_string()],
            pinned_repos: Vec::new(),
            pinned_branches: vec!["main".to_string(), "master".to_string()],
            repo_pinned_branches: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }
}

/// Coerce per-repository pin lists once, at load time
///
/// A list keeps its string and scalar items, a lone scalar becomes a
/// one-element list, null becomes empty, and anything else is dropped with
/// a warning.
fn deserialize_repo_pins<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut pins = BTreeMap::new();

    for (identifier, value) in raw {
        let branches = match value {
            Value::Null => Vec::new(),
            Value::Sequence(items) => items
                .into_iter()
                .filter_map(|item| {
                    let branch = scalar_to_string(&item);
                    if branch.is_none() {
                        tracing::warn!(repo = %identifier, "ignoring non-scalar pinned branch entry");
                    }
                    branch
                })
                .collect(),
            other => match scalar_to_string(&other) {
                Some(branch) => vec![branch],
                None => {
                    tracing::warn!(repo = %identifier, "ignoring malformed pinned branch list");
                    continue;
                }
            },
        };
        pins.insert(identifier, branches);
    }

    Ok(pins)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Explicit configuration store with a load / `save()` lifecycle
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Backing file, `None` for an in-memory store
    path: Option<PathBuf>,
    settings: Settings,
}

impl ConfigStore {
    /// Load configuration, preferring an explicit file path
    ///
    /// Without one, the first existing default location is used; if none
    /// exists the store starts from defaults and saves to the home directory.
    /// The CLI feeds `--config` / `ROVE_CONFIG` in as `explicit`.
    pub fn load_with_override(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(&path);
        }

        let candidates = Self::candidate_paths();
        if let Some(existing) = candidates.iter().find(|p| p.is_file()) {
            return Self::load_from_file(existing);
        }

        let target = candidates
            .last()
            .cloned()
            .ok_or_else(|| Error::Config("Could not determine a config file location".to_string()))?;
        tracing::debug!(path = %target.display(), "no config file found, using defaults");

        Ok(Self {
            path: Some(target),
            settings: Settings::default(),
        })
    }

    /// Load configuration from a specific file; a missing file yields defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::parse(&contents)
                .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?
        } else {
            Settings::default()
        };

        tracing::debug!(path = %path.display(), "configuration loaded");

        Ok(Self {
            path: Some(path.to_path_buf()),
            settings,
        })
    }

    /// A store that never touches the filesystem
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            settings,
        }
    }

    fn parse(contents: &str) -> Result<Settings> {
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Lookup order: current directory, then home directory
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }
        candidates
    }

    /// Persist the settings to the backing file
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            tracing::debug!("in-memory config store, nothing to save");
            return Ok(());
        };

        let contents = serde_yaml::to_string(&self.settings)?;
        std::fs::write(path, contents)?;
        tracing::info!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // --- search folders ---

    /// Search folders, normalized; entries that fail to expand are skipped
    pub fn search_folders(&self) -> Vec<PathBuf> {
        self.settings
            .search_folders
            .iter()
            .filter_map(|raw| match paths::normalize(raw) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(folder = %raw, error = %e, "skipping search folder");
                    None
                }
            })
            .collect()
    }

    pub fn raw_search_folders(&self) -> &[String] {
        &self.settings.search_folders
    }

    /// Add a search folder; returns false if it was already present
    pub fn add_search_folder(&mut self, folder: &str) -> bool {
        push_unique(&mut self.settings.search_folders, folder)
    }

    /// Remove a search folder by its configured or normalized form
    pub fn delete_search_folder(&mut self, folder: &str) -> bool {
        let target = paths::normalize(folder).ok();
        let before = self.settings.search_folders.len();
        self.settings.search_folders.retain(|existing| {
            existing != folder && (target.is_none() || paths::normalize(existing).ok() != target)
        });
        self.settings.search_folders.len() != before
    }

    /// Remove a search folder by position, returning it
    pub fn delete_search_folder_at(&mut self, index: usize) -> Option<String> {
        (index < self.settings.search_folders.len())
            .then(|| self.settings.search_folders.remove(index))
    }

    // --- pinned repositories ---

    pub fn pinned_repos(&self) -> &[String] {
        &self.settings.pinned_repos
    }

    /// Pinned repository paths, normalized, in priority order
    pub fn pinned_repo_paths(&self) -> Vec<PathBuf> {
        self.settings
            .pinned_repos
            .iter()
            .map(|raw| paths::normalize(raw).unwrap_or_else(|_| PathBuf::from(raw)))
            .collect()
    }

    /// Pin a repository path; returns false if it was already pinned
    ///
    /// An entry naming the same directory through another symlinked route
    /// counts as already pinned.
    pub fn add_pinned_repo(&mut self, path: &Path) -> bool {
        if self.settings.pinned_repos.iter().any(|existing| same_location(existing, path)) {
            return false;
        }
        self.settings.pinned_repos.push(path.display().to_string());
        true
    }

    /// Remove every entry that names `path`, literally or physically
    pub fn delete_pinned_repo(&mut self, path: &Path) -> bool {
        let before = self.settings.pinned_repos.len();
        self.settings
            .pinned_repos
            .retain(|existing| !same_location(existing, path));
        self.settings.pinned_repos.len() != before
    }

    // --- global pinned branches ---

    pub fn global_pinned_branches(&self) -> &[String] {
        &self.settings.pinned_branches
    }

    pub fn is_branch_globally_pinned(&self, branch: &str) -> bool {
        self.settings.pinned_branches.iter().any(|b| b == branch)
    }

    pub fn add_global_pinned_branch(&mut self, branch: &str) -> bool {
        push_unique(&mut self.settings.pinned_branches, branch)
    }

    pub fn delete_global_pinned_branch(&mut self, branch: &str) -> bool {
        remove_all(&mut self.settings.pinned_branches, branch)
    }

    // --- per-repository pinned branches ---

    pub fn repo_pinned_branches(&self) -> &BTreeMap<String, Vec<String>> {
        &self.settings.repo_pinned_branches
    }

    pub fn is_branch_pinned_for_repo(&self, identifier: &str, branch: &str) -> bool {
        self.settings
            .repo_pinned_branches
            .get(identifier)
            .is_some_and(|branches| branches.iter().any(|b| b == branch))
    }

    pub fn add_repo_pinned_branch(&mut self, identifier: &str, branch: &str) -> bool {
        let branches = self
            .settings
            .repo_pinned_branches
            .entry(identifier.to_string())
            .or_default();
        push_unique(branches, branch)
    }

    /// Unpin a branch for a repository; an emptied list is removed entirely
    pub fn delete_repo_pinned_branch(&mut self, identifier: &str, branch: &str) -> bool {
        let Some(branches) = self.settings.repo_pinned_branches.get_mut(identifier) else {
            return false;
        };
        let removed = remove_all(branches, branch);
        if branches.is_empty() {
            self.settings.repo_pinned_branches.remove(identifier);
        }
        removed
    }

    // --- aliases ---

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.settings.aliases
    }

    pub fn alias(&self, short: &str) -> Option<&str> {
        self.settings.aliases.get(short).map(String::as_str)
    }

    /// Add or replace an alias, returning the previous expansion
    pub fn add_alias(&mut self, short: &str, expanded: &str) -> Result<Option<String>> {
        if short.trim().is_empty() {
            return Err(Error::Config("Alias name cannot be empty".to_string()));
        }
        if expanded.trim().is_empty() {
            return Err(Error::Config(format!("Alias '{}' needs a non-empty expansion", short)));
        }
        Ok(self
            .settings
            .aliases
            .insert(short.to_string(), expanded.to_string()))
    }

    pub fn delete_alias(&mut self, short: &str) -> Option<String> {
        self.settings.aliases.remove(short)
    }
}

fn same_location(raw: &str, path: &Path) -> bool {
    if raw == path.display().to_string() {
        return true;
    }
    match paths::normalize(raw) {
        Ok(normalized) => normalized == path || paths::canonical(&normalized) == paths::canonical(path),
        Err(_) => false,
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| existing == value) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_all(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != value);
    list.len() != before
}
