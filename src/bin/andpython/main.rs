//! andpython CLI - cross-compile CPython for Android

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use andpython::ops::{default_jobs, xcompile, PatchPolicy, XcompileOptions};
use andpython::util::config::{load_config_layer, OptionKey, Options};
use andpython::util::StreamingRunner;
use andpython::{BuildEnv, Layout};
use cli::Cli;

fn main() {
    // A closed stdout (`andpython | head`) must not turn into a panic.
    let mut stdout = io::stdout();
    if let Err(e) = run() {
        let _ = writeln!(stdout, "Building failed! Reason: {:#}", e);
        std::process::exit(1);
    }
    let _ = writeln!(stdout, "All done.");
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("andpython=debug")
    } else {
        EnvFilter::new("andpython=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Captured before anything runs; later stages derive from it.
    let env = BuildEnv::from_process();

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let file = load_config_layer(cli.config.as_deref(), &cwd)?;
    let options = Options::from_env(&file, &cli.overrides());

    for key in OptionKey::ALL {
        tracing::debug!("{} = {:?}", key.name(), options.get(key));
    }

    let layout = Layout::new(&options, &cwd, &cli.prepatch_dir, &cli.postpatch_dir);
    let opts = XcompileOptions {
        options,
        layout,
        jobs: cli.jobs.filter(|&j| j > 0).unwrap_or_else(default_jobs),
        patch_policy: if cli.strict_patches {
            PatchPolicy::Strict
        } else {
            PatchPolicy::Lenient
        },
    };

    let mut runner = StreamingRunner::stdout();
    let report = xcompile(&opts, &env, &mut runner)?;

    for (arch, state) in &report.targets {
        tracing::debug!("{}: {}", arch, state);
    }

    Ok(())
}
