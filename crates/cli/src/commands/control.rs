// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overseer release` and `overseer wake` - the two standalone operator
//! commands besides team create/disband.

use crate::chat::send_command;
use overseer_core::Config;

pub fn release(config: &Config) -> anyhow::Result<()> {
    send_command(config, "RELEASE")?;
    println!("Requested release of the idle/dormancy hold");
    Ok(())
}

pub fn wake(config: &Config) -> anyhow::Result<()> {
    send_command(config, "WAKE_GITHUB")?;
    println!("Requested an immediate issue tracker poll");
    Ok(())
}
