// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symlink dotfiles into place from a store of application directories.
//!
//! A __dotfile store__ is a directory whose immediate subdirectories are
//! __application directories__. Each application directory keeps the
//! dotfiles of one tool together with a manifest, `dotfile.json`, that lists
//! where every dotfile should be linked to. Installing creates those links.
//! Uninstalling swaps each link for a standalone copy of what it pointed to.
//!
//! Every destructive or structural change to the filesystem is confirmed by
//! the operator first through [`prompt::Confirm`].
//!
//! # See Also
//!
//! 1. [`store`]
//! 2. [`deploy`]
//! 3. [`manifest`]

pub mod deploy;
pub mod manifest;
pub mod path;
pub mod prompt;
pub mod store;
