//! Audit trail stamping
//!
//! The only code that writes `created_by/created_at`, `approved_by/approved_at`
//! and `updated_at`. Callers never supply these fields; they are derived from
//! the acting identity at the moment a mutation is accepted.
use crate::actor::Actor;
use crate::cash_call::{CashCall, CashCallDraft, CashCallStatus, Priority, TimeStamp};

/// Materialize a validated draft into a stored record. `affiliate_id` is
/// passed separately because the mutation guard may have overridden the
/// caller-supplied value.
pub fn stamp_created(
    draft: &CashCallDraft,
    id: String,
    call_number: String,
    affiliate_id: String,
    actor: &Actor,
) -> CashCall {
    let now = TimeStamp::new();
    CashCall {
        id,
        call_number,
        affiliate_id,
        amount_requested: draft.amount_requested,
        // validate() has run by the time we get here
        currency: draft.currency.unwrap_or(crate::cash_call::Currency::USD),
        priority: draft.priority.unwrap_or(Priority::Normal),
        status: draft.initial_status.unwrap_or(CashCallStatus::Draft),
        created_by: actor.id.clone(),
        created_at: now.clone(),
        approved_by: None,
        approved_at: None,
        updated_at: now,
    }
}

/// Apply an accepted transition. First entry into `Approved` records the
/// approver; the stamps are never cleared or rewritten by anything that
/// happens later.
pub fn stamp_transition(cash_call: &CashCall, target: CashCallStatus, actor: &Actor) -> CashCall {
    let mut updated = cash_call.clone();
    updated.status = target;
    if target == CashCallStatus::Approved && updated.approved_by.is_none() {
        updated.approved_by = Some(actor.id.clone());
        updated.approved_at = Some(TimeStamp::new());
    }
    updated.updated_at = TimeStamp::new();
    updated
}
