// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tracing::info;

use spaced_core::{SyncEngine, SyncOutcome};

use crate::error::{Error, Result};
use crate::transport::HttpTransport;

const SERVER_ENV: &str = "SPACED_SERVER";

/// Push cadence in watch mode.
const PUSH_INTERVAL: Duration = Duration::from_secs(10);
/// Pull every N push ticks; pulling is cheaper to do less often.
const PULL_EVERY_TICKS: u32 = 3;

pub fn run(
    server: Option<String>,
    push_only: bool,
    pull_only: bool,
    watch: bool,
) -> Result<()> {
    let url = server
        .or_else(|| std::env::var(SERVER_ENV).ok().filter(|v| !v.is_empty()))
        .ok_or(Error::NoServer)?;

    let mut client = super::open_client()?;
    let engine = SyncEngine::new(HttpTransport::new(url).map_err(Error::Core)?);

    if watch {
        return watch_loop(&engine, &mut client, push_only, pull_only);
    }

    let mut failed = false;

    if !pull_only {
        let outcome = engine.push_pending(&mut client).map_err(Error::Core)?;
        failed |= outcome == SyncOutcome::Failed;
        println!("push: {}", describe(outcome, "pushed"));
    }

    if !push_only {
        let outcome = engine.pull_remote(&mut client).map_err(Error::Core)?;
        failed |= outcome == SyncOutcome::Failed;
        println!("pull: {}", describe(outcome, "pulled"));
    }

    if failed {
        return Err(Error::Core(spaced_core::Error::Transport(
            "sync cycle failed; run again to retry".to_string(),
        )));
    }

    Ok(())
}

/// Fixed-interval sync loop: push every tick, pull every few ticks.
///
/// Failed cycles are logged and naturally retried on the next tick;
/// operations are idempotent, so no per-cycle retry is needed.
fn watch_loop<P, C>(
    engine: &SyncEngine<HttpTransport>,
    client: &mut spaced_core::Client<P, C>,
    push_only: bool,
    pull_only: bool,
) -> Result<()>
where
    P: spaced_core::Persistence,
    C: spaced_core::Clock,
{
    let mut tick: u32 = 0;
    loop {
        if !pull_only {
            let outcome = engine.push_pending(client).map_err(Error::Core)?;
            info!(outcome = %describe(outcome, "pushed"), "push tick");
        }

        if !push_only && tick % PULL_EVERY_TICKS == 0 {
            let outcome = engine.pull_remote(client).map_err(Error::Core)?;
            info!(outcome = %describe(outcome, "pulled"), "pull tick");
        }

        tick = tick.wrapping_add(1);
        std::thread::sleep(PUSH_INTERVAL);
    }
}

fn describe(outcome: SyncOutcome, verb: &str) -> String {
    match outcome {
        SyncOutcome::InFlight => "already in flight".to_string(),
        SyncOutcome::Offline => "offline".to_string(),
        SyncOutcome::NoIdentity => {
            "no client identity (run 'spaced init' first)".to_string()
        }
        SyncOutcome::Idle => "nothing to do".to_string(),
        SyncOutcome::Completed(count) => format!("{verb} {count} operations"),
        SyncOutcome::Failed => "failed".to_string(),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
