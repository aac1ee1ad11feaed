//! End-to-end walkthrough of the cash call engine against a throwaway
//! sled database: register an affiliate, raise a call, run it through
//! review and payout, and print the notifications that came out.

use cash_call_engine::{
    actor::{Actor, Role},
    cash_call::{Affiliate, AffiliateStatus, CashCallDraft, CashCallStatus, Currency, Priority},
    service::CashCallService,
    utils,
    workflow::MemorySink,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let dir = tempfile::tempdir()?;
    let db = Arc::new(sled::open(dir.path().join("engine_demo.db"))?);
    let sink = Arc::new(MemorySink::new());
    let service = CashCallService::new(db, sink.clone());

    let admin = Actor::new(utils::mint_id("user_")?, Role::Admin);
    let approver = Actor::new(utils::mint_id("user_")?, Role::Approver);

    let affiliate = Affiliate {
        id: utils::mint_id("aff_")?,
        name: "Northwind Energy".into(),
        company_code: "NWE-001".into(),
        status: AffiliateStatus::Active,
    };
    service.put_affiliate(&admin, affiliate.clone())?;

    let requester = Actor::affiliate(utils::mint_id("user_")?, affiliate.id.clone());

    let call = service.create(
        &requester,
        CashCallDraft::new()
            .set_amount_requested(1_250_000)
            .set_currency(Currency::USD)
            .set_priority(Priority::High),
    )?;
    println!("created {} ({})", call.call_number, call.status.label());

    let call = service.transition(&requester, &call.id, CashCallStatus::UnderReview)?;
    let call = service.transition(&approver, &call.id, CashCallStatus::Approved)?;
    let call = service.transition(&approver, &call.id, CashCallStatus::Paid)?;
    println!(
        "final status {} approved by {:?}",
        call.status.label(),
        call.approved_by
    );

    for event in sink.drain() {
        println!(
            "event: {} {} -> {} ({})",
            event.cash_call_id, event.old_status, event.new_status, event.affiliate_name
        );
    }

    Ok(())
}
