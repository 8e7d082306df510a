//! Patch-related type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// A package a patch declares itself compatible with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatiblePackage {
    pub name: String,
    /// Allowed version strings; empty means any version is accepted
    #[serde(default)]
    pub versions: Vec<String>,
}

impl CompatiblePackage {
    /// Create a declaration for a package
    pub fn new<I, S>(name: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    /// Declaration accepting any version of `name`
    pub fn any_version(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
        }
    }
}

/// What applying a patch requires from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    /// Rewrites program code only
    #[default]
    Bytecode,
    /// Needs resources decoded and recompiled
    Resource,
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytecode => write!(f, "bytecode"),
            Self::Resource => write!(f, "resource"),
        }
    }
}

/// Catalog entry describing a patch's identity, compatibility and dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchDescriptor {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Selected by default when presenting choices
    #[serde(default)]
    pub include: bool,
    #[serde(default)]
    pub compatible_packages: Vec<CompatiblePackage>,
    /// Names of patches that must be applied along with this one
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub kind: PatchKind,
}

impl PatchDescriptor {
    /// Create a bytecode patch with no declarations or dependencies
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: String::new(),
            include: false,
            compatible_packages: Vec::new(),
            dependencies: Vec::new(),
            kind: PatchKind::Bytecode,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_include(mut self, include: bool) -> Self {
        self.include = include;
        self
    }

    #[must_use]
    pub fn with_compatible(mut self, package: CompatiblePackage) -> Self {
        self.compatible_packages.push(package);
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: PatchKind) -> Self {
        self.kind = kind;
        self
    }

    /// True when the patch declares no compatible packages at all
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.compatible_packages.is_empty()
    }

    /// True when some declaration names `package`, regardless of version
    #[must_use]
    pub fn declares_package(&self, package: &str) -> bool {
        self.compatible_packages.iter().any(|p| p.name == package)
    }

    /// Display record for this patch
    #[must_use]
    pub fn metadata(&self) -> PatchMetadata {
        PatchMetadata {
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            include: self.include,
        }
    }
}

impl fmt::Display for PatchDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Patch metadata handed to callers building a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub include: bool,
}
