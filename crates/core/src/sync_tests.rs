// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use crate::store::MemoryStore;
use std::sync::atomic::{AtomicBool as StdAtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Barrier, Mutex};

/// Scripted transport for testing the engine.
#[derive(Default)]
struct MockTransport {
    online: StdAtomicBool,
    push_succeeds: StdAtomicBool,
    pushed: Mutex<Vec<Vec<Operation>>>,
    pull_batches: Mutex<Vec<Vec<SequencedOperation>>>,
    pull_calls: Mutex<Vec<u64>>,
    fail_with_error: StdAtomicBool,
}

impl MockTransport {
    fn online() -> Self {
        let transport = MockTransport::default();
        transport.online.store(true, AtomicOrdering::SeqCst);
        transport.push_succeeds.store(true, AtomicOrdering::SeqCst);
        transport
    }

    fn queue_pull(&self, batch: Vec<SequencedOperation>) {
        self.pull_batches.lock().unwrap().push(batch);
    }
}

impl Transport for MockTransport {
    fn is_online(&self) -> bool {
        self.online.load(AtomicOrdering::SeqCst)
    }

    fn push(&self, _client_id: &str, ops: &[Operation]) -> Result<PushAck> {
        if self.fail_with_error.load(AtomicOrdering::SeqCst) {
            return Err(Error::Transport("connection reset".into()));
        }
        self.pushed.lock().unwrap().push(ops.to_vec());
        Ok(PushAck { success: self.push_succeeds.load(AtomicOrdering::SeqCst) })
    }

    fn pull(&self, _client_id: &str, since_seq_no: u64) -> Result<Vec<SequencedOperation>> {
        if self.fail_with_error.load(AtomicOrdering::SeqCst) {
            return Err(Error::Transport("connection reset".into()));
        }
        self.pull_calls.lock().unwrap().push(since_seq_no);
        let mut batches = self.pull_batches.lock().unwrap();
        if batches.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(batches.remove(0))
        }
    }
}

fn client_with_identity() -> Client<MemoryStore> {
    let mut store = MemoryStore::new();
    store.set_client_id("client-1").unwrap();
    Client::open(store).unwrap()
}

#[test]
fn push_skips_when_offline() {
    let engine = SyncEngine::new(MockTransport::default());
    let mut client = client_with_identity();
    client.create_card("F", "B", &[], None).unwrap();

    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::Offline);
    assert_eq!(client.pending_operations().unwrap().len(), 2);
}

#[test]
fn push_skips_without_pending() {
    let engine = SyncEngine::new(MockTransport::online());
    let mut client = client_with_identity();

    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::Idle);
}

#[test]
fn push_skips_without_identity() {
    let engine = SyncEngine::new(MockTransport::online());
    let mut client = Client::open(MemoryStore::new()).unwrap();
    client.create_card("F", "B", &[], None).unwrap();

    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::NoIdentity);
    assert_eq!(client.pending_operations().unwrap().len(), 2);
}

#[test]
fn push_sends_and_clears_pending() {
    let engine = SyncEngine::new(MockTransport::online());
    let mut client = client_with_identity();
    client.create_card("F", "B", &[], None).unwrap();

    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::Completed(2));
    assert!(client.pending_operations().unwrap().is_empty());
    assert_eq!(engine.transport().pushed.lock().unwrap()[0].len(), 2);
}

#[test]
fn push_failure_keeps_pending_for_next_cycle() {
    let transport = MockTransport::online();
    transport.fail_with_error.store(true, AtomicOrdering::SeqCst);
    let engine = SyncEngine::new(transport);

    let mut client = client_with_identity();
    client.create_card("F", "B", &[], None).unwrap();

    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::Failed);
    assert_eq!(client.pending_operations().unwrap().len(), 2);

    // Next cycle succeeds and drains the queue.
    engine.transport().fail_with_error.store(false, AtomicOrdering::SeqCst);
    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::Completed(2));
    assert!(client.pending_operations().unwrap().is_empty());
}

#[test]
fn push_rejection_keeps_pending() {
    let transport = MockTransport::online();
    transport.push_succeeds.store(false, AtomicOrdering::SeqCst);
    let engine = SyncEngine::new(transport);

    let mut client = client_with_identity();
    client.create_card("F", "B", &[], None).unwrap();

    assert_eq!(engine.push_pending(&mut client).unwrap(), SyncOutcome::Failed);
    assert_eq!(client.pending_operations().unwrap().len(), 2);
}

#[test]
fn pull_applies_and_advances_sequence() {
    let transport = MockTransport::online();
    transport.queue_pull(vec![
        SequencedOperation {
            seq_no: 1,
            op: Operation::card_content("c1".into(), "F".into(), "B".into(), 100),
        },
        SequencedOperation {
            seq_no: 2,
            op: Operation::card_deleted("c1".into(), false, 200),
        },
    ]);
    let engine = SyncEngine::new(transport);

    let mut client = client_with_identity();
    assert_eq!(engine.pull_remote(&mut client).unwrap(), SyncOutcome::Completed(2));
    assert_eq!(client.last_applied_seq_no().unwrap(), 2);
    assert!(client.projection().card("c1").is_some());

    // The next pull asks for operations after the stored sequence number.
    assert_eq!(engine.pull_remote(&mut client).unwrap(), SyncOutcome::Idle);
    assert_eq!(*engine.transport().pull_calls.lock().unwrap(), vec![0, 2]);
}

#[test]
fn pull_without_identity_is_noop() {
    let engine = SyncEngine::new(MockTransport::online());
    let mut client = Client::open(MemoryStore::new()).unwrap();

    assert_eq!(engine.pull_remote(&mut client).unwrap(), SyncOutcome::NoIdentity);
}

#[test]
fn pull_failure_is_retried_next_cycle() {
    let transport = MockTransport::online();
    transport.fail_with_error.store(true, AtomicOrdering::SeqCst);
    let engine = SyncEngine::new(transport);

    let mut client = client_with_identity();
    assert_eq!(engine.pull_remote(&mut client).unwrap(), SyncOutcome::Failed);
    assert_eq!(client.last_applied_seq_no().unwrap(), 0);
}

#[test]
fn pull_and_push_cycles_are_idempotent() {
    let transport = MockTransport::online();
    let batch = vec![SequencedOperation {
        seq_no: 1,
        op: Operation::card_content("c1".into(), "F".into(), "B".into(), 100),
    }];
    transport.queue_pull(batch.clone());
    transport.queue_pull(batch);
    let engine = SyncEngine::new(transport);

    let mut client = client_with_identity();
    engine.pull_remote(&mut client).unwrap();
    // Redelivered batch: nothing new applied, sequence number stable.
    engine.pull_remote(&mut client).unwrap();

    assert_eq!(client.last_applied_seq_no().unwrap(), 1);
    assert_eq!(client.projection().cards().len(), 1);
}

/// Transport that blocks inside push until released, to exercise the
/// re-entrancy guard from a second thread.
struct BlockingTransport {
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

impl Transport for BlockingTransport {
    fn is_online(&self) -> bool {
        true
    }

    fn push(&self, _client_id: &str, _ops: &[Operation]) -> Result<PushAck> {
        self.entered.wait();
        self.release.wait();
        Ok(PushAck { success: true })
    }

    fn pull(&self, _client_id: &str, _since_seq_no: u64) -> Result<Vec<SequencedOperation>> {
        Ok(Vec::new())
    }
}

#[test]
fn concurrent_push_coalesces_to_noop() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let engine = Arc::new(SyncEngine::new(BlockingTransport {
        entered: entered.clone(),
        release: release.clone(),
    }));

    let engine_clone = engine.clone();
    let completed = Arc::new(AtomicUsize::new(0));
    let completed_clone = completed.clone();

    let handle = std::thread::spawn(move || {
        let mut client = client_with_identity();
        client.create_card("F", "B", &[], None).unwrap();
        let outcome = engine_clone.push_pending(&mut client).unwrap();
        if matches!(outcome, SyncOutcome::Completed(_)) {
            completed_clone.fetch_add(1, AtomicOrdering::SeqCst);
        }
    });

    // Wait until the first push is inside the transport, then re-enter.
    entered.wait();
    let mut other_client = client_with_identity();
    other_client.create_card("F", "B", &[], None).unwrap();
    assert_eq!(engine.push_pending(&mut other_client).unwrap(), SyncOutcome::InFlight);

    release.wait();
    handle.join().unwrap();
    assert_eq!(completed.load(AtomicOrdering::SeqCst), 1);
}
