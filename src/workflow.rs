//! Lifecycle state machine for cash call statuses
//!
//! Legal flow: `draft -> under_review -> {approved -> paid | rejected}`.
//! `rejected` and `paid` are terminal. No transition skips a state; the
//! admin override in the service layer is the one audited exception.
use crate::actor::{Actor, Role};
use crate::cash_call::{CashCall, CashCallStatus};
use crate::error::{EngineError, EngineResult};
use crate::permission::{self, Permission};
use crate::visibility;

/// Legal successor statuses. Terminal statuses return the empty slice.
pub fn successors(status: CashCallStatus) -> &'static [CashCallStatus] {
    use CashCallStatus::*;
    match status {
        Draft => &[UnderReview],
        UnderReview => &[Approved, Rejected],
        Approved => &[Paid],
        Rejected | Paid => &[],
    }
}

/// Self-loops are not legal transitions.
pub fn is_legal(from: CashCallStatus, to: CashCallStatus) -> bool {
    successors(from).contains(&to)
}

/// Whether `to` lies forward of `from` on the successor chain, possibly
/// skipping intermediate statuses. Terminal statuses reach nothing, so no
/// path ever leads back out of `Rejected` or `Paid`.
pub fn is_reachable(from: CashCallStatus, to: CashCallStatus) -> bool {
    successors(from)
        .iter()
        .any(|&next| next == to || is_reachable(next, to))
}

/// Validate a requested transition without touching the store.
///
/// Check order matters and is part of the contract:
/// 1. invisible record -> `NotFound`, indistinguishable from a missing id,
///    so unauthorized actors cannot probe for existence;
/// 2. a role holding no transition grant at all -> `Forbidden` before the
///    workflow is consulted, so read-only actors never learn whether the
///    move would have been legal;
/// 3. illegal `from -> to` pair -> `InvalidTransition`;
/// 4. missing grant for this specific pair -> `Forbidden`;
/// 5. affiliate ownership re-check -> `Forbidden`. Duplicates step 1 on
///    purpose; defense in depth against a diverging caller.
pub fn check_transition(
    actor: &Actor,
    cash_call: &CashCall,
    target: CashCallStatus,
) -> EngineResult<()> {
    if !visibility::can_see(actor, cash_call) {
        return Err(EngineError::NotFound);
    }
    if !permission::can_transition_at_all(actor.role) {
        return Err(EngineError::Forbidden);
    }
    let from = cash_call.status;
    if !is_legal(from, target) {
        return Err(EngineError::InvalidTransition { from, to: target });
    }
    if !permission::can(actor, Permission::Transition { from, to: target }) {
        return Err(EngineError::Forbidden);
    }
    if actor.role == Role::Affiliate
        && actor.owned_affiliate_id.as_deref() != Some(cash_call.affiliate_id.as_str())
    {
        return Err(EngineError::Forbidden);
    }
    Ok(())
}

/// Emitted after every accepted status change, for notification consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeEvent {
    pub cash_call_id: String,
    pub old_status: CashCallStatus,
    pub new_status: CashCallStatus,
    pub affiliate_name: String,
}

/// Notification seam. The engine only pushes; delivery semantics belong to
/// the consumer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StatusChangeEvent);
}

/// Drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: StatusChangeEvent) {}
}

/// Collects events in memory; intended for tests and demos.
#[derive(Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<StatusChangeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn drain(&self) -> Vec<StatusChangeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: StatusChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}
