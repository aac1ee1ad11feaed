//! Service layer API for cash call workflow operations
//!
//! This is the mutation guard: every write path re-checks permissions and
//! visibility before touching the store, and every status write goes through
//! a compare-and-swap against the exact bytes the checks ran on. A record
//! that changes between check and write fails the swap and the checks re-run
//! against its current state.
use crate::actor::{Actor, Role};
use crate::audit;
use crate::cash_call::{Affiliate, CashCall, CashCallDraft, CashCallStatus};
use crate::error::{EngineError, EngineResult};
use crate::permission::{self, Permission};
use crate::utils;
use crate::visibility;
use crate::workflow::{self, EventSink, NullSink, StatusChangeEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

const CALL_PREFIX: &str = "call_";
const AFFILIATE_PREFIX: &str = "aff_";

/// Outcome of one id within a bulk operation. Bulk runs never abort early;
/// partial success is the expected shape of the result.
#[derive(Debug)]
pub struct BulkOutcome {
    pub cash_call_id: String,
    pub outcome: EngineResult<CashCall>,
}

pub struct CashCallService {
    instance: Arc<sled::Db>,
    sink: Arc<dyn EventSink>,
}

impl CashCallService {
    pub fn new(instance: Arc<sled::Db>, sink: Arc<dyn EventSink>) -> Self {
        Self { instance, sink }
    }

    /// Service without a notification consumer attached.
    pub fn with_null_sink(instance: Arc<sled::Db>) -> Self {
        Self::new(instance, Arc::new(NullSink))
    }

    /// Load a cash call together with the exact stored bytes, kept for the
    /// compare-and-swap on the following write.
    fn load_call(&self, cash_call_id: &str) -> EngineResult<Option<(CashCall, sled::IVec)>> {
        // ids from other key spaces can never resolve to a cash call
        if !cash_call_id.starts_with(CALL_PREFIX) {
            return Ok(None);
        }
        match self.instance.get(cash_call_id.as_bytes())? {
            Some(bytes) => {
                let call: CashCall = minicbor::decode(&bytes)?;
                Ok(Some((call, bytes)))
            }
            None => Ok(None),
        }
    }

    /// All records the actor may observe.
    pub fn list_visible(&self, actor: &Actor) -> EngineResult<Vec<CashCall>> {
        let mut calls = Vec::new();
        for item in self.instance.scan_prefix(CALL_PREFIX.as_bytes()) {
            let (_, value) = item?;
            calls.push(minicbor::decode(&value)?);
        }
        Ok(visibility::visible(actor, calls))
    }

    /// Single-record read through the same predicate as the list read. A
    /// record the actor may not see reports as missing, identical to a true
    /// not-found.
    pub fn get(&self, actor: &Actor, cash_call_id: &str) -> EngineResult<CashCall> {
        let (call, _) = self.load_call(cash_call_id)?.ok_or(EngineError::NotFound)?;
        if !visibility::can_see(actor, &call) {
            return Err(EngineError::NotFound);
        }
        Ok(call)
    }

    /// Create a new cash call.
    ///
    /// Affiliate actors have `affiliate_id` forced to their own affiliate
    /// regardless of what the draft carries; anyone else must reference an
    /// affiliate that exists in the directory.
    pub fn create(&self, actor: &Actor, draft: CashCallDraft) -> EngineResult<CashCall> {
        let affiliate_id = match actor.role {
            Role::Affiliate => {
                if !permission::can(actor, Permission::CreateOwnOnly) {
                    return Err(EngineError::Forbidden);
                }
                // forced override; a forged draft value must not escalate
                actor.owned_affiliate_id.clone().ok_or_else(|| {
                    EngineError::Validation(
                        "affiliate actor is missing an owning affiliate id".into(),
                    )
                })?
            }
            _ => {
                if !permission::can(actor, Permission::Create) {
                    warn!(actor = %actor.id, "create denied");
                    return Err(EngineError::Forbidden);
                }
                let id = draft
                    .affiliate_id
                    .clone()
                    .ok_or_else(|| EngineError::Validation("affiliate id is required".into()))?;
                if self.get_affiliate(&id)?.is_none() {
                    return Err(EngineError::Validation(format!(
                        "affiliate {id} does not exist"
                    )));
                }
                id
            }
        };

        draft.validate()?;

        let id = utils::mint_id(CALL_PREFIX).map_err(|e| EngineError::Codec(e.to_string()))?;
        let call_number = utils::mint_call_number();
        let call = audit::stamp_created(&draft, id, call_number, affiliate_id, actor);

        self.instance
            .insert(call.id.as_bytes(), minicbor::to_vec(&call)?)?;

        info!(id = %call.id, number = %call.call_number, status = %call.status, "cash call created");
        Ok(call)
    }

    /// Apply one validated status transition.
    pub fn transition(
        &self,
        actor: &Actor,
        cash_call_id: &str,
        target: CashCallStatus,
    ) -> EngineResult<CashCall> {
        loop {
            let (current, old_bytes) =
                self.load_call(cash_call_id)?.ok_or(EngineError::NotFound)?;
            workflow::check_transition(actor, &current, target)?;

            let updated = audit::stamp_transition(&current, target, actor);
            let new_bytes = minicbor::to_vec(&updated)?;

            match self
                .instance
                .compare_and_swap(cash_call_id.as_bytes(), Some(old_bytes), Some(new_bytes))?
            {
                Ok(()) => {
                    info!(id = %cash_call_id, from = %current.status, to = %target, "cash call transitioned");
                    self.emit_status_change(&updated, current.status);
                    return Ok(updated);
                }
                Err(_) => {
                    // record moved under us; re-run every check against its
                    // current state
                    debug!(id = %cash_call_id, "concurrent update, retrying transition");
                    continue;
                }
            }
        }
    }

    /// Admin-only path that may skip intermediate statuses, but only forward
    /// along the successor chain; terminal records stay terminal and nothing
    /// moves backward. An audited exception, not a silent bypass: it is
    /// logged distinctly from normal transitions, which refuse skips even
    /// for admins.
    pub fn admin_override(
        &self,
        actor: &Actor,
        cash_call_id: &str,
        target: CashCallStatus,
    ) -> EngineResult<CashCall> {
        if !permission::can(actor, Permission::AdminOverride) {
            warn!(actor = %actor.id, "admin override denied");
            return Err(EngineError::Forbidden);
        }
        loop {
            let (current, old_bytes) =
                self.load_call(cash_call_id)?.ok_or(EngineError::NotFound)?;
            if !visibility::can_see(actor, &current) {
                return Err(EngineError::NotFound);
            }
            if !workflow::is_reachable(current.status, target) {
                return Err(EngineError::InvalidTransition {
                    from: current.status,
                    to: target,
                });
            }

            let updated = audit::stamp_transition(&current, target, actor);
            let new_bytes = minicbor::to_vec(&updated)?;

            match self
                .instance
                .compare_and_swap(cash_call_id.as_bytes(), Some(old_bytes), Some(new_bytes))?
            {
                Ok(()) => {
                    warn!(id = %cash_call_id, actor = %actor.id, from = %current.status, to = %target, "admin override applied");
                    self.emit_status_change(&updated, current.status);
                    return Ok(updated);
                }
                Err(_) => continue,
            }
        }
    }

    /// Transition many ids to one target status. Every id is checked and
    /// written independently; one failure never stops the rest, and there is
    /// no rollback across ids.
    pub fn bulk_transition(
        &self,
        actor: &Actor,
        cash_call_ids: &[String],
        target: CashCallStatus,
    ) -> Vec<BulkOutcome> {
        let holds_bulk = permission::can(actor, Permission::BulkTransition);
        cash_call_ids
            .iter()
            .map(|id| BulkOutcome {
                cash_call_id: id.clone(),
                outcome: if holds_bulk {
                    self.transition(actor, id, target)
                } else {
                    Err(EngineError::Forbidden)
                },
            })
            .collect()
    }

    /// Destructive removal. Gated like any mutation; invisible records
    /// report as missing.
    pub fn delete(&self, actor: &Actor, cash_call_id: &str) -> EngineResult<()> {
        let (call, _) = self.load_call(cash_call_id)?.ok_or(EngineError::NotFound)?;
        if !visibility::can_see(actor, &call) {
            return Err(EngineError::NotFound);
        }
        if !permission::can(actor, Permission::Delete) {
            warn!(actor = %actor.id, id = %cash_call_id, "delete denied");
            return Err(EngineError::Forbidden);
        }
        self.instance.remove(cash_call_id.as_bytes())?;
        info!(id = %cash_call_id, "cash call deleted");
        Ok(())
    }

    /// Register or replace an affiliate in the directory.
    pub fn put_affiliate(&self, actor: &Actor, affiliate: Affiliate) -> EngineResult<()> {
        if !permission::can(actor, Permission::ManageAffiliates) {
            warn!(actor = %actor.id, "affiliate management denied");
            return Err(EngineError::Forbidden);
        }
        if !affiliate.id.starts_with(AFFILIATE_PREFIX) {
            return Err(EngineError::Validation(format!(
                "affiliate id must carry the {AFFILIATE_PREFIX} prefix"
            )));
        }
        self.instance
            .insert(affiliate.id.as_bytes(), minicbor::to_vec(&affiliate)?)?;
        Ok(())
    }

    /// Affiliate directory lookup backing create-time referential checks and
    /// event enrichment.
    pub fn get_affiliate(&self, affiliate_id: &str) -> EngineResult<Option<Affiliate>> {
        if !affiliate_id.starts_with(AFFILIATE_PREFIX) {
            return Ok(None);
        }
        match self.instance.get(affiliate_id.as_bytes())? {
            Some(bytes) => Ok(Some(minicbor::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn emit_status_change(&self, updated: &CashCall, old_status: CashCallStatus) {
        // enrichment only; a missing directory entry must not fail the write
        let affiliate_name = self
            .get_affiliate(&updated.affiliate_id)
            .ok()
            .flatten()
            .map(|a| a.name)
            .unwrap_or_else(|| updated.affiliate_id.clone());
        self.sink.emit(StatusChangeEvent {
            cash_call_id: updated.id.clone(),
            old_status,
            new_status: updated.status,
            affiliate_name,
        });
    }
}
