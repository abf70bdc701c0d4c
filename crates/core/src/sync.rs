// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background sync: push pending operations, pull remote operations.
//!
//! Both directions are idempotent and safe to trigger from a timer, a
//! connectivity-regained event, or a shutdown hook. A failed cycle is
//! logged and left for the next tick; nothing is retried inline, which is
//! always safe because operations are keyed by stable ids and timestamps.
//!
//! Re-entrant calls while a cycle is in flight are coalesced into a no-op
//! (`SyncOutcome::InFlight`), guarded by an atomic flag so the behavior
//! holds under preemptive threads, not just a cooperative event loop.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::client::Client;
use crate::clock::Clock;
use crate::error::Result;
use crate::op::{Operation, SequencedOperation};
use crate::store::Persistence;

/// Acknowledgment returned by the transport for a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushAck {
    pub success: bool,
}

/// Transport seam to the remote store.
///
/// The remote assigns sequence numbers; the client never does. Timeouts
/// and cancellation are the transport's responsibility.
pub trait Transport {
    /// Returns whether the network is currently reachable.
    fn is_online(&self) -> bool;

    /// Sends a batch of operations to the remote store.
    fn push(&self, client_id: &str, ops: &[Operation]) -> Result<PushAck>;

    /// Fetches operations with sequence numbers strictly greater than
    /// `since_seq_no`, sorted by sequence number.
    fn pull(&self, client_id: &str, since_seq_no: u64) -> Result<Vec<SequencedOperation>>;
}

/// Result of one push or pull cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A cycle in the same direction was already in flight.
    InFlight,
    /// Offline; nothing attempted.
    Offline,
    /// No client identity established yet; nothing attempted.
    NoIdentity,
    /// Nothing to send or receive.
    Idle,
    /// The cycle completed; the count is operations pushed or pulled.
    Completed(usize),
    /// The transport failed; the cycle will retry on the next tick.
    Failed,
}

/// Push/pull engine over a transport.
pub struct SyncEngine<T: Transport> {
    transport: T,
    push_in_flight: AtomicBool,
    pull_in_flight: AtomicBool,
}

impl<T: Transport> SyncEngine<T> {
    /// Creates an engine over the given transport.
    pub fn new(transport: T) -> Self {
        SyncEngine {
            transport,
            push_in_flight: AtomicBool::new(false),
            pull_in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Pushes the pending queue to the remote store.
    ///
    /// The pending set is snapshotted before the request; on success,
    /// exactly those operations are removed, so operations enqueued while
    /// the push was in flight stay queued for the next cycle.
    pub fn push_pending<P: Persistence, C: Clock>(
        &self,
        client: &mut Client<P, C>,
    ) -> Result<SyncOutcome> {
        if self.push_in_flight.swap(true, Ordering::SeqCst) {
            return Ok(SyncOutcome::InFlight);
        }
        let outcome = self.push_pending_locked(client);
        self.push_in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    fn push_pending_locked<P: Persistence, C: Clock>(
        &self,
        client: &mut Client<P, C>,
    ) -> Result<SyncOutcome> {
        if !self.transport.is_online() {
            return Ok(SyncOutcome::Offline);
        }

        let pending = client.pending_operations()?;
        if pending.is_empty() {
            return Ok(SyncOutcome::Idle);
        }

        let Some(client_id) = client.client_id()? else {
            return Ok(SyncOutcome::NoIdentity);
        };

        match self.transport.push(&client_id, &pending) {
            Ok(PushAck { success: true }) => {
                client.acknowledge_pending(pending.len())?;
                debug!(count = pending.len(), "pushed pending operations");
                Ok(SyncOutcome::Completed(pending.len()))
            }
            Ok(PushAck { success: false }) => {
                warn!("remote rejected pushed operations");
                Ok(SyncOutcome::Failed)
            }
            Err(err) => {
                warn!(error = %err, "push failed; will retry next cycle");
                Ok(SyncOutcome::Failed)
            }
        }
    }

    /// Pulls operations after the stored sequence number and applies them.
    pub fn pull_remote<P: Persistence, C: Clock>(
        &self,
        client: &mut Client<P, C>,
    ) -> Result<SyncOutcome> {
        if self.pull_in_flight.swap(true, Ordering::SeqCst) {
            return Ok(SyncOutcome::InFlight);
        }
        let outcome = self.pull_remote_locked(client);
        self.pull_in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    fn pull_remote_locked<P: Persistence, C: Clock>(
        &self,
        client: &mut Client<P, C>,
    ) -> Result<SyncOutcome> {
        let Some(client_id) = client.client_id()? else {
            return Ok(SyncOutcome::NoIdentity);
        };

        let since = client.last_applied_seq_no()?;
        let batch = match self.transport.pull(&client_id, since) {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, "pull failed; will retry next cycle");
                return Ok(SyncOutcome::Failed);
            }
        };

        if batch.is_empty() {
            return Ok(SyncOutcome::Idle);
        }

        let count = batch.len();
        client.apply_remote(&batch)?;
        Ok(SyncOutcome::Completed(count))
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
