// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile store management.
//!
//! Dotlink groups dotfiles into __application directories__ that all sit
//! together in one place called the __dotfile store__. Each application
//! directory holds the dotfiles of one tool, plus a manifest describing where
//! those dotfiles belong.
//!
//! # Dotfile Store Layout
//!
//! ```text
//! dotfiles/
//! ├── nvim/
//! │   ├── dotfile.json
//! │   └── config/
//! └── zsh/
//!     ├── dotfile.json
//!     └── zshrc
//! ```
//!
//! Only the top-level of the store is evaluated. Application directories
//! cannot nest inside one another.
//!
//! # Processing Order
//!
//! Applications are processed one after another in the order they were
//! selected, and their entries in manifest order. Entries of unknown type
//! are reported and skipped. An entry whose source is missing, or whose
//! paths cannot be resolved, halts the entire run on the spot, so nothing
//! after it gets processed.

use crate::{
    deploy::{DeployError, Deployment, Outcome},
    manifest::{manifest_path, EntryKind, FileEntry, Manifest, ManifestError, MANIFEST_FILE_NAME},
    path::{resolve, PathError},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{canonicalize, read_dir},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Which way to deploy each entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Link targets to sources.
    #[default]
    Install,

    /// Replace target links with copies of their sources.
    Uninstall,
}

impl Display for RunMode {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Install => fmt.write_str("install"),
            Self::Uninstall => fmt.write_str("uninstall"),
        }
    }
}

/// Which application directories to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Application directories named by the operator.
    Explicit(Vec<String>),

    /// Every application directory in the store.
    All,
}

impl Selection {
    /// Determine selection from command line input.
    ///
    /// Explicit names win over `all`. Returns `None` if neither is given,
    /// because there is no default selection.
    pub fn from_args(names: Vec<String>, all: bool) -> Option<Self> {
        if !names.is_empty() {
            Some(Self::Explicit(names))
        } else if all {
            Some(Self::All)
        } else {
            None
        }
    }
}

/// Application directory in the dotfile store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDir {
    /// Name of application directory as given or discovered.
    pub name: String,

    /// Absolute path to application directory.
    pub path: PathBuf,
}

/// Manifest entry with both path expressions resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub source: PathBuf,
    pub target: PathBuf,
}

impl ResolvedEntry {
    /// Resolve and validate a symlink entry.
    ///
    /// # Errors
    ///
    /// - Return [`EntryError::MissingPath`] if the entry lacks a source or a
    ///   target.
    /// - Return [`EntryError::Path`] if either path expression is
    ///   unsupported.
    /// - Return [`EntryError::MissingSource`] if the resolved source does not
    ///   exist.
    pub fn resolve(entry: &FileEntry, app_dir: &Path, home: &Path) -> Result<Self, EntryError> {
        let source = entry
            .source
            .as_deref()
            .ok_or(EntryError::MissingPath { field: "source" })?;
        let target = entry
            .target
            .as_deref()
            .ok_or(EntryError::MissingPath { field: "target" })?;

        let source = resolve(source, app_dir, home)?;
        let target = resolve(target, app_dir, home)?;

        if !source.exists() {
            return Err(EntryError::MissingSource { path: source });
        }

        Ok(Self { source, target })
    }
}

/// Tally of what happened during a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub linked: usize,
    pub copied: usize,
    pub skipped: usize,
    pub unknown: usize,
}

impl Report {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Linked => self.linked += 1,
            Outcome::Copied => self.copied += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }
}

impl Display for Report {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "{} linked, {} copied, {} skipped, {} unknown",
            self.linked, self.copied, self.skipped, self.unknown
        )
    }
}

/// Dotfile store of application directories.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Open dotfile store at target path.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Open`] if the path cannot be made absolute,
    ///   usually because it does not exist.
    #[instrument(skip(path), level = "debug")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = canonicalize(path.as_ref()).map_err(|err| StoreError::Open {
            source: err,
            path: path.as_ref().to_path_buf(),
        })?;
        debug!("open dotfile store: {:?}", root.display());

        Ok(Self { root })
    }

    /// Absolute path to the dotfile store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Determine application directories to process.
    ///
    /// Explicit names are taken as is, in the order given. Selecting all
    /// lists every immediate subdirectory of the store sorted by name,
    /// leaving out those without a manifest, like `.git`.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::List`] if the store cannot be listed.
    pub fn select(&self, selection: &Selection) -> Result<Vec<AppDir>> {
        match selection {
            Selection::Explicit(names) => Ok(names
                .iter()
                .map(|name| AppDir {
                    name: name.clone(),
                    path: self.root.join(name),
                })
                .collect()),
            Selection::All => self.list_app_dirs(),
        }
    }

    fn list_app_dirs(&self) -> Result<Vec<AppDir>> {
        let list_error = |err| StoreError::List {
            source: err,
            path: self.root.clone(),
        };

        let mut apps = Vec::new();
        for entry in read_dir(&self.root).map_err(list_error)? {
            let entry = entry.map_err(list_error)?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            if !manifest_path(&path).is_file() {
                info!("skip {:?}, no {MANIFEST_FILE_NAME}", path.display());
                continue;
            }

            apps.push(AppDir {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
        apps.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(apps)
    }

    /// Process manifests of application directories.
    ///
    /// Each symlink entry is resolved against its application directory and
    /// `home`, validated, then handed to `deployer` according to `mode`.
    ///
    /// # Errors
    ///
    /// - Return [`StoreError::Manifest`] if a manifest cannot be loaded.
    /// - Return [`StoreError::InvalidEntry`] if an entry fails validation.
    ///   Nothing after that entry is processed.
    /// - Return [`StoreError::Deploy`] if deployment logic fails.
    #[instrument(skip(self, apps, deployer), level = "debug")]
    pub fn apply(
        &self,
        apps: &[AppDir],
        mode: RunMode,
        home: &Path,
        deployer: &mut impl Deployment,
    ) -> Result<Report> {
        let mut report = Report::default();
        for app in apps {
            debug!("{mode} {}", app.name);
            let manifest = Manifest::load(&app.path)?;

            for entry in &manifest {
                if let EntryKind::Unknown(kind) = &entry.kind {
                    warn!("Unknown type: {kind}");
                    report.unknown += 1;
                    continue;
                }

                let resolved = ResolvedEntry::resolve(entry, &app.path, home).map_err(|err| {
                    StoreError::InvalidEntry {
                        source: err,
                        app: app.name.clone(),
                    }
                })?;

                let outcome = match mode {
                    RunMode::Install => deployer.install(&resolved.source, &resolved.target)?,
                    RunMode::Uninstall => deployer.uninstall(&resolved.source, &resolved.target)?,
                };
                if let Outcome::Skipped(reason) = &outcome {
                    debug!("skip {:?}: {reason}", resolved.target.display());
                }
                report.record(&outcome);
            }
        }

        info!("{mode} finished: {report}");
        Ok(report)
    }
}

/// Entry validation error types.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// Symlink entry lacks a path expression.
    #[error("symlink entry has no {field}")]
    MissingPath { field: &'static str },

    /// Path expression cannot be resolved.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Resolved source does not exist.
    #[error("source {:?} does not exist", path.display())]
    MissingSource { path: PathBuf },
}

/// Dotfile store error types.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Dotfile store cannot be opened.
    #[error("failed to open dotfile store at {:?}", path.display())]
    Open {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Dotfile store cannot be listed.
    #[error("failed to list application directories in {:?}", path.display())]
    List {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Manifest of application directory cannot be loaded.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Manifest entry failed validation.
    #[error("invalid entry in {app:?}")]
    InvalidEntry {
        #[source]
        source: EntryError,
        app: String,
    },

    /// Deployment logic fails.
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Friendly result alias :3
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
