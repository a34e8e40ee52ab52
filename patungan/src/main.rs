#![warn(clippy::uninlined_format_args)]

use std::collections::HashMap;

use chrono::Utc;
use patungan_application::{
    ports::RequestContext, BillingError, BillingService, CreateBillRequest, FailureKind,
    ItemRecord, ParticipantRecord, SplitMethodRecord, SplitRecord,
};
use patungan_domain::{
    model::{Money, UserId},
    services::BillBuilder,
};
use patungan_infrastructure::{FixedSessionProvider, MemoryBillStore, MemoryLedger};
use patungan_presentation::{format_billing_error, format_idr, BillPresenter};
use rust_decimal::Decimal;
use uuid::Uuid;

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        match err.kind() {
            FailureKind::InternalBug => {
                tracing::error!(error = ?err, "Billing failed due to internal bug");
            }
            FailureKind::Misconfiguration => {
                tracing::warn!(error = ?err, "Billing failed due to misconfiguration");
            }
            FailureKind::UserInput => {
                tracing::info!(error = ?err, "Billing rejected user input");
            }
        }
        eprintln!("{}", format_billing_error(&err));
        std::process::exit(1);
    }
}

/// Walks one bill through its whole life: top-ups, creation, a self-paid
/// share, and an external share settled by the creator.
fn run() -> Result<(), BillingError> {
    let andi = UserId(Uuid::new_v4());
    let budi = UserId(Uuid::new_v4());
    let directory = HashMap::from([
        (andi, "Andi".to_string()),
        (budi, "Budi".to_string()),
    ]);

    let store = MemoryBillStore::new();
    let ledger = MemoryLedger::new();
    let builder = BillBuilder::idr();
    let service = BillingService::new(&store, &ledger, &builder);

    ledger.open_account(andi, Money::ZERO);
    ledger.open_account(budi, Money::ZERO);

    let session = FixedSessionProvider::signed_in(andi, "demo-session");
    let actor = RequestContext::from_session(&session)?.actor;

    service.add_balance(budi, Money::from_i64(100_000))?;

    let request = CreateBillRequest {
        bill_name: "Makan Malam".to_string(),
        split_method: SplitMethodRecord::PerProduct,
        participants: vec![
            ParticipantRecord {
                user_id: Some(andi.0),
                external_name: None,
            },
            ParticipantRecord {
                user_id: Some(budi.0),
                external_name: None,
            },
            ParticipantRecord {
                user_id: None,
                external_name: Some("Sari".to_string()),
            },
        ],
        items: vec![
            ItemRecord {
                name: "Nasi Goreng".to_string(),
                price_per_unit: Decimal::from(30_000),
                quantity: 2,
                split: vec![
                    SplitRecord {
                        user_id: Some(andi.0),
                        external_name: None,
                        quantity: 1,
                    },
                    SplitRecord {
                        user_id: Some(budi.0),
                        external_name: None,
                        quantity: 1,
                    },
                ],
            },
            ItemRecord {
                name: "Es Teh".to_string(),
                price_per_unit: Decimal::from(5_000),
                quantity: 3,
                split: Vec::new(),
            },
        ],
    };

    let bill = service.create_bill(actor, request, Utc::now())?;
    println!("{}", BillPresenter::render(&bill, &directory));

    let receipt = service.pay_bill(budi, bill.id, Utc::now())?;
    println!(
        "Budi paid {}, balance now {}",
        format_idr(receipt.amount_paid),
        format_idr(receipt.new_balance)
    );

    let external = service.mark_participant_paid(actor, bill.id, 2, Utc::now())?;
    println!(
        "{} settled {} in cash",
        external.participant_name,
        format_idr(external.amount_paid)
    );

    let settled = service.get_bill(bill.id)?;
    println!("{}", BillPresenter::render(&settled, &directory));

    Ok(())
}
