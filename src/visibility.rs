//! The shared visibility predicate
//!
//! Exactly one place computes "may this actor see this record". List reads,
//! single-record reads and every mutation guard call [`can_see`]; keeping a
//! second copy anywhere else reintroduces the drift between read filtering
//! and write guarding that this module exists to prevent.
use crate::actor::{Actor, Role};
use crate::cash_call::CashCall;

pub fn can_see(actor: &Actor, cash_call: &CashCall) -> bool {
    match actor.role {
        Role::Admin | Role::Approver | Role::Viewer => true,
        Role::Affiliate => match actor.owned_affiliate_id.as_deref() {
            Some(owned) => cash_call.affiliate_id == owned,
            // fail closed: a malformed affiliate actor sees nothing
            None => false,
        },
    }
}

pub fn visible(actor: &Actor, cash_calls: Vec<CashCall>) -> Vec<CashCall> {
    cash_calls
        .into_iter()
        .filter(|call| can_see(actor, call))
        .collect()
}
