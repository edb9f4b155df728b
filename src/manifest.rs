// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Manifest layout.
//!
//! Every application directory carries a __manifest__ named `dotfile.json`
//! at its top-level. The manifest is a JSON array of file entries, each
//! naming what kind of action to take, where the dotfile lives, and where it
//! should end up:
//!
//! ```json
//! [
//!     { "type": "symlink", "source": "./config", "target": "~/.config/app" }
//! ]
//! ```
//!
//! Entries are kept in document order. Only the `symlink` type means anything
//! right now. Other types still parse, so that the driver can report them
//! and move on instead of rejecting the whole manifest.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Name of manifest file inside each application directory.
pub const MANIFEST_FILE_NAME: &str = "dotfile.json";

/// Ordered listing of file entries for one application.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: Vec<FileEntry>,
}

impl Manifest {
    /// Load manifest of application directory.
    ///
    /// # Errors
    ///
    /// - Return [`ManifestError::Read`] if manifest file cannot be read.
    /// - Return [`ManifestError::Parse`] if manifest file is not a valid
    ///   listing of file entries.
    pub fn load(app_dir: impl AsRef<Path>) -> Result<Self> {
        let path = manifest_path(app_dir);
        let data = read_to_string(&path).map_err(|err| ManifestError::Read {
            source: err,
            path: path.clone(),
        })?;

        serde_json::from_str(&data).map_err(|err| ManifestError::Parse { source: err, path })
    }

    /// Iterate through file entries in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for Manifest {
    type Err = serde_json::Error;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(data)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Determine path to manifest file of application directory.
pub fn manifest_path(app_dir: impl AsRef<Path>) -> PathBuf {
    app_dir.as_ref().join(MANIFEST_FILE_NAME)
}

/// Single source-to-target operation.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct FileEntry {
    /// What to do with the entry.
    #[serde(rename = "type")]
    pub kind: EntryKind,

    /// Path expression of the dotfile in the application directory.
    ///
    /// Only symlink entries need one. Other types may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Path expression of where the dotfile should appear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl FileEntry {
    /// Construct new file entry.
    pub fn new(kind: EntryKind, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }
}

/// Type of file entry.
///
/// Unrecognized types keep their raw value around for reporting.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum EntryKind {
    /// Link target to source.
    Symlink,

    /// Anything else.
    Unknown(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Symlink => "symlink",
            Self::Unknown(kind) => kind.as_str(),
        }
    }
}

impl From<String> for EntryKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "symlink" => Self::Symlink,
            _ => Self::Unknown(kind),
        }
    }
}

impl From<&str> for EntryKind {
    fn from(kind: &str) -> Self {
        Self::from(kind.to_owned())
    }
}

impl Display for EntryKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntryKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for EntryKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Manifest error types.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file cannot be read.
    #[error("failed to read manifest at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Manifest file is malformed.
    #[error("failed to parse manifest at {:?}", path.display())]
    Parse {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = ManifestError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs::write;

    #[test]
    fn deserialize_manifest() -> anyhow::Result<()> {
        let result: Manifest = indoc! {r#"
            [
                { "type": "symlink", "source": "./config", "target": "~/.config/app" },
                { "type": "script", "source": "./setup.sh", "target": "~/bin/setup" },
                { "type": "symlink", "source": "./bashrc", "target": "~/.bashrc", "note": "ignored" }
            ]
        "#}
        .parse()?;

        let expect = Manifest {
            entries: vec![
                FileEntry::new(EntryKind::Symlink, "./config", "~/.config/app"),
                FileEntry::new(
                    EntryKind::Unknown("script".into()),
                    "./setup.sh",
                    "~/bin/setup",
                ),
                FileEntry::new(EntryKind::Symlink, "./bashrc", "~/.bashrc"),
            ],
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn serialize_manifest() -> anyhow::Result<()> {
        let manifest = Manifest {
            entries: vec![
                FileEntry::new(EntryKind::Symlink, "./vimrc", "~/.vimrc"),
                FileEntry::new("copy".into(), "./gitconfig", "~/.gitconfig"),
            ],
        };

        let result = serde_json::to_string_pretty(&manifest)?;
        let expect = indoc! {r#"
            [
              {
                "type": "symlink",
                "source": "./vimrc",
                "target": "~/.vimrc"
              },
              {
                "type": "copy",
                "source": "./gitconfig",
                "target": "~/.gitconfig"
              }
            ]"#};

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_entries_without_paths() -> anyhow::Result<()> {
        let result: Manifest = indoc! {r#"
            [
                { "type": "script", "command": "./setup.sh" },
                { "type": "symlink", "source": "./rc" }
            ]
        "#}
        .parse()?;

        let expect = Manifest {
            entries: vec![
                FileEntry {
                    kind: EntryKind::Unknown("script".into()),
                    source: None,
                    target: None,
                },
                FileEntry {
                    kind: EntryKind::Symlink,
                    source: Some("./rc".into()),
                    target: None,
                },
            ],
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn reject_malformed_manifest() {
        assert!(r#"{ "type": "symlink" }"#.parse::<Manifest>().is_err());
        assert!(r#"[{ "source": "./a", "target": "~/a" }]"#
            .parse::<Manifest>()
            .is_err());
        assert!(r#"[{ "type": 1, "source": "./a", "target": "~/a" }]"#
            .parse::<Manifest>()
            .is_err());
    }

    #[test]
    fn load_manifest_from_app_dir() -> anyhow::Result<()> {
        let app_dir = tempfile::tempdir()?;
        write(
            app_dir.path().join(MANIFEST_FILE_NAME),
            r#"[{ "type": "symlink", "source": "./zshrc", "target": "~/.zshrc" }]"#,
        )?;

        let manifest = Manifest::load(app_dir.path())?;
        assert_eq!(manifest.len(), 1);
        assert_eq!(
            manifest.iter().next(),
            Some(&FileEntry::new(EntryKind::Symlink, "./zshrc", "~/.zshrc"))
        );

        Ok(())
    }

    #[test]
    fn load_reports_missing_and_malformed_manifest() -> anyhow::Result<()> {
        let app_dir = tempfile::tempdir()?;
        let result = Manifest::load(app_dir.path());
        assert!(matches!(result, Err(ManifestError::Read { .. })));

        write(app_dir.path().join(MANIFEST_FILE_NAME), "not json")?;
        let result = Manifest::load(app_dir.path());
        assert!(matches!(
            result,
            Err(ManifestError::Parse { path, .. }) if path == manifest_path(app_dir.path())
        ));

        Ok(())
    }
}
