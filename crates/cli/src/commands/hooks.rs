// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `steroids hooks test`: fire a synthetic hook event through the
//! configured `STEROIDS_HOOK_COMMAND` so operators can verify wiring
//! without waiting for a real task transition (distilled spec §4.11
//! HookDispatcher: "never fails the loop").

use anyhow::Result;
use clap::{Args, Subcommand};
use steroids_adapters::ProcessHookDispatcher;
use steroids_core::ports::hook::{HookDispatcher, HookEvent};

#[derive(Debug, Args)]
pub struct HooksArgs {
    #[command(subcommand)]
    pub action: HooksAction,
}

#[derive(Debug, Subcommand)]
pub enum HooksAction {
    /// Fire one event at the configured hook command and report the result.
    Test {
        /// e.g. `task.completed`, `credit.exhausted`.
        event: String,
    },
    /// Print the currently configured hook command, if any.
    Show,
}

pub async fn run(args: HooksArgs) -> Result<()> {
    match args.action {
        HooksAction::Test { event } => {
            let command = steroids_daemon::env::hook_command();
            if command.is_none() {
                println!("no hook command configured (set STEROIDS_HOOK_COMMAND)");
                return Ok(());
            }
            let dispatcher = ProcessHookDispatcher::new(command);
            let payload = serde_json::json!({"source": "steroids hooks test"});
            dispatcher.fire(&HookEvent::new(event.clone()), payload).await;
            println!("fired {event}");
            Ok(())
        }
        HooksAction::Show => {
            match steroids_daemon::env::hook_command() {
                Some(command) => println!("{command}"),
                None => println!("no hook command configured"),
            }
            Ok(())
        }
    }
}
