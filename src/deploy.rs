// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Dotfile deployment logic.
//!
//! Deploying a dotfile means placing a symlink at its target location that
//! points back to the source inside the application directory. Undeploying
//! reverses that, but instead of leaving a hole behind, the symlink is
//! replaced by an independent copy of the source. The target stays usable
//! even if the dotfiles repository goes away afterwards.
//!
//! Nothing here destroys or creates structure on the filesystem without the
//! operator's consent first. Obstructions at the target, and missing ancestor
//! directories of the target, each get their own [`Confirm`] prompt.
//! Declining is never an error. The affected entry is simply left alone, and
//! the returned [`Outcome`] says why.
//!
//! Undeployment is stricter still. It only ever touches a target that is a
//! symlink pointing at exactly the expected source. Anything else was put
//! there by someone else, and is reported instead of overwritten.

use crate::prompt::{Confirm, PromptError, Terminal};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Upper bound on ancestors visited when ensuring directories exist.
pub const MAX_ANCESTOR_DEPTH: usize = 100;

/// Make sure every ancestor directory of a path exists.
///
/// Walks upward from `path` through its parents, stopping at the filesystem
/// root or after [`MAX_ANCESTOR_DEPTH`] steps. Missing ancestors are then
/// created from the top down, parent before child, asking for confirmation
/// before each one. `path` itself is never created.
///
/// Returns `false` as soon as the operator declines a prompt. Nothing at or
/// below the declined directory gets created in that case, and the caller
/// must not go on to touch `path`.
///
/// # Errors
///
/// - Return [`DeployError::CreateDir`] if a directory cannot be created.
/// - Return [`DeployError::Prompt`] if the operator cannot be asked.
#[instrument(skip(confirm), level = "debug")]
pub fn ensure_dir_exists(path: &Path, confirm: &mut impl Confirm) -> Result<bool> {
    let mut ancestors = Vec::new();
    let mut current = path;
    for _ in 0..MAX_ANCESTOR_DEPTH {
        let Some(parent) = current.parent() else {
            break;
        };

        // INVARIANT: Never try to create the filesystem root.
        if parent.as_os_str().is_empty() || parent.parent().is_none() {
            break;
        }

        ancestors.push(parent);
        current = parent;
    }

    for dir in ancestors.into_iter().rev() {
        if dir.exists() {
            continue;
        }

        let prompt = format!(
            "`{}` doesn't exist - do you want to create it? (Yes/No)",
            dir.display()
        );
        if !confirm.confirm(&prompt)? {
            debug!("operator declined to create {}", dir.display());
            return Ok(false);
        }

        fs::create_dir(dir).map_err(|err| DeployError::CreateDir {
            source: err,
            path: dir.to_path_buf(),
        })?;
    }

    Ok(true)
}

/// Result of deploying or undeploying a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Target now links to source.
    Linked,

    /// Target link was replaced by a copy of source.
    Copied,

    /// Nothing was changed.
    Skipped(SkipReason),
}

/// Why an entry was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Operator refused to overwrite existing target.
    OverwriteDeclined,

    /// Operator refused to create a missing ancestor directory.
    CreateDirDeclined,

    /// Nothing exists at target.
    TargetMissing,

    /// Target exists, but is not a symlink.
    NotSymlink,

    /// Target is a symlink that does not point at source.
    PointsElsewhere { actual: PathBuf },
}

impl Display for SkipReason {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::OverwriteDeclined => fmt.write_str("overwrite declined"),
            Self::CreateDirDeclined => fmt.write_str("directory creation declined"),
            Self::TargetMissing => fmt.write_str("target missing"),
            Self::NotSymlink => fmt.write_str("target not a symlink"),
            Self::PointsElsewhere { actual } => write!(fmt, "target points to {}", actual.display()),
        }
    }
}

/// Deploy or undeploy a resolved source and target pair.
pub trait Deployment {
    /// Link `target` to `source`.
    fn install(&mut self, source: &Path, target: &Path) -> Result<Outcome>;

    /// Replace link at `target` with a copy of `source`.
    fn uninstall(&mut self, source: &Path, target: &Path) -> Result<Outcome>;
}

/// Deployment through filesystem symlinks.
#[derive(Debug, Default)]
pub struct SymlinkDeployer<C = Terminal>
where
    C: Confirm,
{
    confirm: C,
}

impl<C> SymlinkDeployer<C>
where
    C: Confirm,
{
    /// Construct new symlink deployer asking `confirm` for consent.
    pub fn new(confirm: C) -> Self {
        Self { confirm }
    }

    /// Access confirmation source.
    pub fn confirm(&self) -> &C {
        &self.confirm
    }
}

impl<C> Deployment for SymlinkDeployer<C>
where
    C: Confirm,
{
    /// Link `target` to `source`.
    ///
    /// Anything already at `target` is removed first, but only with the
    /// operator's consent. A symlink is unlinked, a directory is removed
    /// along with its contents, and anything else is removed as a file.
    /// Missing ancestors of `target` are handled by [`ensure_dir_exists`].
    #[instrument(skip(self), level = "debug")]
    fn install(&mut self, source: &Path, target: &Path) -> Result<Outcome> {
        // INVARIANT: Dangling symlinks count as obstructions too.
        if target.exists() || target.is_symlink() {
            let prompt = format!(
                "`{}` exists - do you want to overwrite it? (Yes/No)",
                target.display()
            );
            if !self.confirm.confirm(&prompt)? {
                debug!("operator declined to overwrite {}", target.display());
                return Ok(Outcome::Skipped(SkipReason::OverwriteDeclined));
            }

            remove_existing(target)?;
        }

        if !ensure_dir_exists(target, &mut self.confirm)? {
            return Ok(Outcome::Skipped(SkipReason::CreateDirDeclined));
        }

        info!("Symlinking {} to {}", source.display(), target.display());
        symlink(source, target).map_err(|err| DeployError::Symlink {
            source: err,
            path: target.to_path_buf(),
        })?;

        Ok(Outcome::Linked)
    }

    /// Replace link at `target` with a copy of `source`.
    ///
    /// Refuses to act unless `target` is a symlink whose recorded
    /// destination is exactly `source`. Directories are copied recursively.
    /// Files are copied with their metadata, except that a symlinked source
    /// is reproduced as a symlink rather than followed.
    #[instrument(skip(self), level = "debug")]
    fn uninstall(&mut self, source: &Path, target: &Path) -> Result<Outcome> {
        if !target.exists() {
            warn!("{} does not exist. Not uninstalling.", target.display());
            return Ok(Outcome::Skipped(SkipReason::TargetMissing));
        }

        if !target.is_symlink() {
            warn!("{} is not a symlink. Not overwriting.", target.display());
            return Ok(Outcome::Skipped(SkipReason::NotSymlink));
        }

        let actual = fs::read_link(target).map_err(|err| DeployError::ReadLink {
            source: err,
            path: target.to_path_buf(),
        })?;
        if actual != source {
            warn!(
                "{} points to {}. Expected {}. Not overwriting.",
                target.display(),
                actual.display(),
                source.display()
            );
            return Ok(Outcome::Skipped(SkipReason::PointsElsewhere { actual }));
        }

        info!("Copying {} to {}", source.display(), target.display());

        // INVARIANT: Remove link before copying, or the copy lands in source.
        fs::remove_file(target).map_err(|err| DeployError::Remove {
            source: err,
            path: target.to_path_buf(),
        })?;

        if source.is_dir() {
            copy_dir_recursive(source, target)?;
        } else {
            copy_file_no_follow(source, target)?;
        }

        Ok(Outcome::Copied)
    }
}

fn remove_existing(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|err| DeployError::Remove {
        source: err,
        path: path.to_path_buf(),
    })?;

    let removed = if metadata.file_type().is_symlink() {
        fs::remove_file(path)
    } else if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    removed.map_err(|err| DeployError::Remove {
        source: err,
        path: path.to_path_buf(),
    })
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir(dst).map_err(|err| DeployError::CreateDir {
        source: err,
        path: dst.to_path_buf(),
    })?;

    let entries = fs::read_dir(src).map_err(|err| DeployError::ReadDir {
        source: err,
        path: src.to_path_buf(),
    })?;
    for entry in entries {
        let entry = entry.map_err(|err| DeployError::ReadDir {
            source: err,
            path: src.to_path_buf(),
        })?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        // INVARIANT: Follow symlinks inside the tree, copying what they point to.
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            copy_file_with_metadata(&src_path, &dst_path)?;
        }
    }

    let metadata = fs::metadata(src).map_err(|err| copy_error(err, src, dst))?;
    fs::set_permissions(dst, metadata.permissions()).map_err(|err| copy_error(err, src, dst))?;

    Ok(())
}

fn copy_file_no_follow(src: &Path, dst: &Path) -> Result<()> {
    if src.is_symlink() {
        let link = fs::read_link(src).map_err(|err| DeployError::ReadLink {
            source: err,
            path: src.to_path_buf(),
        })?;
        debug!("recreate symlink {} -> {}", dst.display(), link.display());
        return symlink(&link, dst).map_err(|err| DeployError::Symlink {
            source: err,
            path: dst.to_path_buf(),
        });
    }

    copy_file_with_metadata(src, dst)
}

fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<()> {
    // NOTE: fs::copy carries permission bits over on its own.
    fs::copy(src, dst).map_err(|err| copy_error(err, src, dst))?;

    let modified = fs::metadata(src)
        .and_then(|metadata| metadata.modified())
        .map_err(|err| copy_error(err, src, dst))?;
    File::open(dst)
        .and_then(|file| file.set_modified(modified))
        .map_err(|err| copy_error(err, src, dst))?;

    Ok(())
}

fn copy_error(err: std::io::Error, src: &Path, dst: &Path) -> DeployError {
    DeployError::Copy {
        source: err,
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
    }
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    if original.is_dir() {
        std::os::windows::fs::symlink_dir(original, link)
    } else {
        std::os::windows::fs::symlink_file(original, link)
    }
}

/// Deployment error types.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Ancestor or copied directory cannot be created.
    #[error("failed to create directory {:?}", path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Existing target cannot be removed.
    #[error("failed to remove {:?}", path.display())]
    Remove {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Symlink cannot be created.
    #[error("failed to create symlink at {:?}", path.display())]
    Symlink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Symlink destination cannot be read.
    #[error("failed to read symlink at {:?}", path.display())]
    ReadLink {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Directory listing cannot be read.
    #[error("failed to read directory {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// File content cannot be copied.
    #[error("failed to copy {:?} to {:?}", from.display(), to.display())]
    Copy {
        #[source]
        source: std::io::Error,
        from: PathBuf,
        to: PathBuf,
    },

    /// Operator cannot be asked for confirmation.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Friendly result alias :3
pub type Result<T, E = DeployError> = std::result::Result<T, E>;
