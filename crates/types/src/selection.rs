//! Caller-supplied patch selections and version matching policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a declaration's version list is checked against the target version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Accept when the version list is empty or contains the target version
    #[default]
    Strict,
    /// Accept whenever the version list is non-empty, whatever the target.
    /// Matches what older manager releases displayed.
    Legacy,
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for VersionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Self::Strict),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown version policy '{other}'")),
        }
    }
}

/// Patches chosen for one target package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PatchSelection {
    pub selected_patches: Vec<String>,
    pub target_package: String,
    pub target_version: String,
    pub ignore_version: bool,
}

impl PatchSelection {
    /// Selection for a target package with no patches picked yet
    pub fn for_target(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            selected_patches: Vec::new(),
            target_package: package.into(),
            target_version: version.into(),
            ignore_version: false,
        }
    }

    #[must_use]
    pub fn with_patches<I, S>(mut self, patches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_patches = patches.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn ignoring_version(mut self, ignore: bool) -> Self {
        self.ignore_version = ignore;
        self
    }

    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected_patches.iter().any(|p| p == name)
    }
}
