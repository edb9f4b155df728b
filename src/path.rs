// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Manifest entries describe their source and target locations through
//! __path expressions__. Only two notations are understood:
//!
//! - `./x` is relative to the application directory owning the manifest.
//! - `~/x` is relative to the home directory of the invoking user.
//!
//! Anything else is rejected when the expression is parsed, so a resolved
//! path is always absolute as long as its base directory is.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoWayHome`] if home directory path cannot be
///   determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(PathError::NoWayHome)
}

/// Parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathExpr {
    /// Expression of the form `./x`.
    AppRelative(PathBuf),

    /// Expression of the form `~/x`.
    HomeRelative(PathBuf),
}

impl PathExpr {
    /// Resolve expression into a filesystem path.
    ///
    /// Pure function. The remainder after the prefix is joined onto either
    /// `app_dir` or `home`, which callers must supply as absolute paths.
    pub fn resolve(&self, app_dir: &Path, home: &Path) -> PathBuf {
        match self {
            Self::AppRelative(rest) => app_dir.join(rest),
            Self::HomeRelative(rest) => home.join(rest),
        }
    }
}

impl FromStr for PathExpr {
    type Err = PathError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = expr.strip_prefix("./") {
            Ok(Self::AppRelative(PathBuf::from(rest)))
        } else if let Some(rest) = expr.strip_prefix("~/") {
            Ok(Self::HomeRelative(PathBuf::from(rest)))
        } else {
            Err(PathError::UnsupportedPrefix { expr: expr.into() })
        }
    }
}

impl Display for PathExpr {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::AppRelative(rest) => write!(fmt, "./{}", rest.display()),
            Self::HomeRelative(rest) => write!(fmt, "~/{}", rest.display()),
        }
    }
}

/// Resolve raw path expression in one go.
///
/// # Errors
///
/// - Return [`PathError::UnsupportedPrefix`] if `expr` starts with neither
///   `./` nor `~/`.
pub fn resolve(expr: &str, app_dir: &Path, home: &Path) -> Result<PathBuf> {
    Ok(expr.parse::<PathExpr>()?.resolve(app_dir, home))
}

/// Path resolution error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No way to determine user's home directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Path expression uses neither `./` nor `~/`.
    #[error("unsupported path expression {expr:?}: expected \"./\" or \"~/\" prefix")]
    UnsupportedPrefix { expr: String },
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("./config", "/dots/app/config"; "app relative file")]
    #[test_case("./nested/dir/init.vim", "/dots/app/nested/dir/init.vim"; "app relative nested")]
    #[test_case("~/.config/app", "/home/blah/.config/app"; "home relative dir")]
    #[test_case("~/.bashrc", "/home/blah/.bashrc"; "home relative file")]
    #[test_case("./", "/dots/app"; "bare app prefix")]
    #[test]
    fn resolve_supported_prefixes(expr: &str, expect: &str) {
        let result = resolve(expr, Path::new("/dots/app"), Path::new("/home/blah")).unwrap();
        assert_eq!(result, PathBuf::from(expect));
    }

    #[test_case("config"; "no prefix")]
    #[test_case("/etc/app.conf"; "absolute")]
    #[test_case("../escape"; "parent relative")]
    #[test_case("~user/file"; "other user home")]
    #[test_case(""; "empty")]
    #[test]
    fn reject_unsupported_prefixes(expr: &str) {
        let result = expr.parse::<PathExpr>();
        assert_eq!(
            result,
            Err(PathError::UnsupportedPrefix { expr: expr.into() })
        );
    }

    #[test]
    fn display_round_trips_expression() {
        let expr: PathExpr = "~/.config/nvim".parse().unwrap();
        assert_eq!(expr.to_string(), "~/.config/nvim");
        assert_eq!(expr, PathExpr::HomeRelative(".config/nvim".into()));
    }
}
