use moveground_core::code::OperationKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one dispatch of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub kind: OperationKind,
    pub seq: u64,
}

/// Per-kind dispatch counters used to drop stale responses.
///
/// Each dispatch takes a ticket; a result is applied only while its ticket
/// is still the latest one issued for that kind.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    build: AtomicU64,
    format: AtomicU64,
    share: AtomicU64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, kind: OperationKind) -> &AtomicU64 {
        match kind {
            OperationKind::Build => &self.build,
            OperationKind::Format => &self.format,
            OperationKind::Share => &self.share,
        }
    }

    pub fn next(&self, kind: OperationKind) -> Ticket {
        let seq = self.counter(kind).fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { kind, seq }
    }

    pub fn latest(&self, kind: OperationKind) -> u64 {
        self.counter(kind).load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest(ticket.kind) == ticket.seq
    }
}
