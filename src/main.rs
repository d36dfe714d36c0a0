// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use regex_advanced::{
    demo::{run_demo, PASSWORD_CANDIDATES, PASSWORD_PATTERN, TAG_CANDIDATES, TAG_PATTERN},
    print_error, Regex,
};

fn main() -> Result<()> {
    // logs go to stderr so that stdout carries the demo output only
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    println!("Backreferences\n");
    run_demo(&compile(TAG_PATTERN)?, &TAG_CANDIDATES)?;

    println!("Lookaround\n");
    run_demo(&compile(PASSWORD_PATTERN)?, &PASSWORD_CANDIDATES)?;

    Ok(())
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|error| anyhow!(print_error(pattern, &error)))
}
