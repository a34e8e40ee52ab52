use std::fmt::Write;

use patungan_application::ports::UserDirectory;
use patungan_domain::model::{Bill, PartyRef, PaymentStatus, SplitMethod};

use crate::currency::format_idr;

pub struct BillPresenter;

impl BillPresenter {
    /// Renders a bill as a plain-text summary. Registered participants are
    /// shown under their directory name, falling back to the raw id when
    /// the directory does not know them.
    pub fn render(bill: &Bill, directory: &dyn UserDirectory) -> String {
        let method = match bill.split_method {
            SplitMethod::Equal => "split equally",
            SplitMethod::PerProduct => "split per product",
        };

        let mut output = String::new();
        let _ = writeln!(output, "Bill: {}", bill.name);
        let _ = writeln!(
            output,
            "Total: {} ({method})",
            format_idr(bill.total_amount)
        );

        for item in &bill.items {
            let _ = writeln!(
                output,
                "  {} x{} @ {} = {}",
                item.name,
                item.quantity,
                format_idr(item.price_per_unit),
                format_idr(item.total())
            );
        }

        for participant in &bill.participants {
            let status = match participant.status {
                PaymentStatus::Paid => "paid",
                PaymentStatus::Unpaid => "unpaid",
            };
            let name = Self::participant_name(&participant.party, directory);
            let _ = writeln!(
                output,
                "  [{status}] {name}: {}",
                format_idr(participant.amount_due)
            );
        }

        output
    }

    fn participant_name(party: &PartyRef, directory: &dyn UserDirectory) -> String {
        match party {
            PartyRef::Registered(user_id) => directory
                .display_name(*user_id)
                .map(str::to_string)
                .unwrap_or_else(|| user_id.to_string()),
            PartyRef::External(name) => format!("{name} (external)"),
        }
    }
}
