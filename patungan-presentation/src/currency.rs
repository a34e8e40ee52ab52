use patungan_domain::model::Money;

/// Formats an amount as Indonesian Rupiah with dot-grouped thousands,
/// e.g. `Rp 165.000`. Amounts reaching this layer are already quantized
/// to whole rupiah.
pub fn format_idr(amount: Money) -> String {
    let decimal = amount.as_decimal().round_dp(0);
    let negative = decimal.is_sign_negative() && !decimal.is_zero();
    let digits = decimal.abs().to_string();
    let grouped = group_thousands(&digits);
    if negative {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && index % 3 == offset % 3 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}
