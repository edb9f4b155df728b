// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotlink::{
    deploy::SymlinkDeployer,
    path::home_dir,
    prompt::Terminal,
    store::{RunMode, Selection, Store},
};

use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit status when no application directory was selected.
const EXIT_NO_SELECTION: i32 = 5;

/// Symlink dotfiles from application directories into place.
#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "dotlink [options] [app_dir]...\n       dotlink [options] --all",
    version
)]
struct Cli {
    /// Application directories to process.
    #[arg(value_name = "app_dir")]
    pub app_dirs: Vec<String>,

    /// Process every application directory in the dotfile store.
    #[arg(short, long)]
    pub all: bool,

    /// Replace installed symlinks with copies of their sources.
    #[arg(long)]
    pub uninstall: bool,

    /// Path to dotfile store instead of the current directory.
    #[arg(short = 'C', long, value_name = "path", default_value = ".")]
    pub directory: PathBuf,
}

impl Cli {
    fn mode(&self) -> RunMode {
        if self.uninstall {
            RunMode::Uninstall
        } else {
            RunMode::Install
        }
    }

    fn run(self, selection: Selection) -> Result<()> {
        let mode = self.mode();
        let store = Store::open(&self.directory)?;
        let apps = store.select(&selection)?;
        let home = home_dir()?;

        let mut deployer = SymlinkDeployer::new(Terminal::new());
        store.apply(&apps, mode, &home, &mut deployer)?;

        Ok(())
    }
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    let cli = Cli::parse();

    // INVARIANT: No default selection, operator must say what to process.
    let Some(selection) = Selection::from_args(cli.app_dirs.clone(), cli.all) else {
        eprintln!("Please pass one or more app directories, or pass the `--all` flag.");
        exit(EXIT_NO_SELECTION);
    };

    if let Err(error) = cli.run(selection) {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}
