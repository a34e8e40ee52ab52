//! Quantization of exact decimal shares to the currency's minor unit.
//!
//! Shares are computed with full decimal precision and only rounded at the
//! edge of the domain. Rounding each share independently can leave the sum a
//! few minor units away from the bill total, so after rounding the drift is
//! repaired by largest-remainder allocation: the participants who gained the
//! most from rounding (or lost the most, depending on the drift direction)
//! each move by exactly one unit until the shares sum to the total again.
//! Ties fall back to declaration order, which keeps the result deterministic.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

use crate::model::Money;

/// Rounding mode for share quantization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (0.5 -> 1). Default for IDR.
    HalfUp,
    /// Round half to nearest even (banker's rounding).
    HalfEven,
}

/// Currency parameters for quantization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrencyContext {
    /// Decimal places of the minor unit (0 for IDR, 2 for USD).
    pub scale: u32,
    pub rounding_mode: RoundingMode,
}

impl CurrencyContext {
    /// Indonesian Rupiah: whole units, no fractional subunit.
    pub fn idr_default() -> Self {
        Self {
            scale: 0,
            rounding_mode: RoundingMode::HalfUp,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareRoundingError {
    /// The exact shares do not sum to the expected total within tolerance.
    /// Indicates a bug in the apportionment that produced them.
    TotalMismatch { expected: Money, actual: Money },
    /// The total is not representable as a whole number of minor units.
    NonIntegralTotal,
    /// A share could not be converted to integer minor units.
    NonIntegral,
    /// Drift repair would need to touch more shares than exist.
    AdjustmentOutOfBounds,
}

const MAX_SUPPORTED_SCALE: u32 = 22;

/// Rounds `exact_shares` to the minor unit so that they sum exactly to
/// `total`.
///
/// `exact_shares` are in declaration order; the returned amounts are
/// positionally aligned with them. Fails rather than silently accepting
/// drift the repair cannot account for.
pub fn quantize_shares(
    exact_shares: &[Decimal],
    total: Money,
    context: CurrencyContext,
) -> Result<Vec<Money>, ShareRoundingError> {
    if context.scale > MAX_SUPPORTED_SCALE {
        return Err(ShareRoundingError::NonIntegral);
    }
    if exact_shares.is_empty() {
        return if total.is_zero() {
            Ok(Vec::new())
        } else {
            Err(ShareRoundingError::TotalMismatch {
                expected: total,
                actual: Money::ZERO,
            })
        };
    }

    let atomic_unit = Decimal::new(1, context.scale);
    let epsilon = quantization_epsilon(context.scale);

    let exact_sum: Decimal = exact_shares.iter().sum();
    if (exact_sum - total.as_decimal()).abs() > epsilon {
        tracing::error!(
            reject_reason = "share_sum_mismatch",
            share_count = exact_shares.len(),
            expected = %total,
            actual = %exact_sum,
            "Share quantization rejected: exact shares do not match the total"
        );
        return Err(ShareRoundingError::TotalMismatch {
            expected: total,
            actual: Money::from_decimal(exact_sum),
        });
    }

    let target_units = decimal_to_units(total.as_decimal(), atomic_unit)
        .ok_or(ShareRoundingError::NonIntegralTotal)?;

    let rounding_strategy = match context.rounding_mode {
        RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
    };

    // (units, diff = rounded - exact) per share
    let mut entries: Vec<(i128, Decimal)> = exact_shares
        .iter()
        .map(|exact| {
            let units = round_to_units(*exact, atomic_unit, rounding_strategy)?;
            let diff = Decimal::from(units) * atomic_unit - *exact;
            Ok((units, diff))
        })
        .collect::<Result<Vec<_>, ShareRoundingError>>()?;

    let rounded_sum: i128 = entries.iter().map(|(units, _)| units).sum();
    let drift = rounded_sum - target_units;

    if drift != 0 {
        let adjustment_count = drift.unsigned_abs() as usize;
        if adjustment_count > entries.len() {
            tracing::error!(
                reject_reason = "drift_exceeds_share_count",
                drift,
                share_count = entries.len(),
                "Share quantization repair exceeded bounds"
            );
            return Err(ShareRoundingError::AdjustmentOutOfBounds);
        }

        // Positive drift: take one unit back from the shares that rounding
        // favored most. Negative drift: give one unit to those it shorted
        // most. Stable index tie-break.
        let score_sign = if drift > 0 {
            Decimal::ONE
        } else {
            Decimal::NEGATIVE_ONE
        };
        let mut ranked: Vec<(usize, Decimal)> = entries
            .iter()
            .enumerate()
            .map(|(index, (_, diff))| (index, *diff * score_sign))
            .collect();
        ranked.sort_by(|(index_a, score_a), (index_b, score_b)| {
            score_b
                .cmp(score_a)
                .then_with(|| index_a.cmp(index_b))
        });

        let step = if drift > 0 { -1 } else { 1 };
        for (index, _) in ranked.iter().take(adjustment_count) {
            entries[*index].0 += step;
        }

        tracing::debug!(
            drift,
            adjustment_count,
            share_count = entries.len(),
            "Share quantization applied remainder repair"
        );
    }

    let repaired_sum: i128 = entries.iter().map(|(units, _)| units).sum();
    debug_assert_eq!(repaired_sum, target_units);

    Ok(entries
        .into_iter()
        .map(|(units, _)| Money::from_decimal(Decimal::from(units) * atomic_unit))
        .collect())
}

fn quantization_epsilon(scale: u32) -> Decimal {
    Decimal::new(1, (scale + 6).min(28))
}

fn round_to_units(
    value: Decimal,
    atomic_unit: Decimal,
    strategy: RoundingStrategy,
) -> Result<i128, ShareRoundingError> {
    let units = (value / atomic_unit).round_dp_with_strategy(0, strategy);
    units.to_i128().ok_or(ShareRoundingError::NonIntegral)
}

fn decimal_to_units(value: Decimal, atomic_unit: Decimal) -> Option<i128> {
    let units = value / atomic_unit;
    if units.fract() != Decimal::ZERO {
        return None;
    }
    units.to_i128()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal")
    }

    #[rstest]
    #[case::equal_thirds_front_loaded(
        vec![dec("33333.33333333"), dec("33333.33333333"), dec("33333.33333333")],
        100_000,
        vec![33_334, 33_333, 33_333],
    )]
    #[case::no_repair_needed(
        vec![dec("100000"), dec("50000")],
        150_000,
        vec![100_000, 50_000],
    )]
    #[case::two_way_split_of_odd_total(
        vec![dec("50000.5"), dec("50000.5")],
        100_001,
        vec![50_000, 50_001],
    )]
    fn quantize_shares_cases(
        #[case] exact: Vec<Decimal>,
        #[case] total: i64,
        #[case] expected: Vec<i64>,
    ) {
        let rounded = quantize_shares(
            &exact,
            Money::from_i64(total),
            CurrencyContext::idr_default(),
        )
        .expect("quantization should succeed");

        let expected: Vec<Money> = expected.into_iter().map(Money::from_i64).collect();
        assert_eq!(rounded, expected);
        let sum: Money = rounded.iter().sum();
        assert_eq!(sum, Money::from_i64(total));
    }

    #[test]
    fn repair_moves_each_adjusted_share_by_one_unit() {
        let exact = vec![dec("0.4"), dec("0.4"), dec("0.2")];
        let rounded = quantize_shares(&exact, Money::from_i64(1), CurrencyContext::idr_default())
            .expect("quantization should succeed");

        let sum: Money = rounded.iter().sum();
        assert_eq!(sum, Money::from_i64(1));
        for (share, original) in rounded.iter().zip(&exact) {
            assert!((share.as_decimal() - original).abs() <= Decimal::ONE);
        }
    }

    #[test]
    fn deterministic_under_equal_remainders() {
        let exact = vec![dec("0.5"), dec("0.5"), dec("0.5"), dec("0.5")];
        let first = quantize_shares(&exact, Money::from_i64(2), CurrencyContext::idr_default())
            .expect("quantization should succeed");
        let second = quantize_shares(&exact, Money::from_i64(2), CurrencyContext::idr_default())
            .expect("quantization should be deterministic");
        assert_eq!(first, second);
    }

    #[test]
    fn half_up_and_half_even_differ_on_midpoints() {
        let exact = vec![dec("0.5"), dec("1.5")];

        let half_up = quantize_shares(
            &exact,
            Money::from_i64(2),
            CurrencyContext {
                scale: 0,
                rounding_mode: RoundingMode::HalfUp,
            },
        )
        .expect("half up should succeed");
        let half_even = quantize_shares(
            &exact,
            Money::from_i64(2),
            CurrencyContext {
                scale: 0,
                rounding_mode: RoundingMode::HalfEven,
            },
        )
        .expect("half even should succeed");

        // Half-up rounds both midpoints away from zero (1 + 2 = 3, repaired
        // down); half-even rounds to 0 + 2 = 2, no repair.
        assert_eq!(half_even, vec![Money::ZERO, Money::from_i64(2)]);
        let half_up_sum: Money = half_up.iter().sum();
        assert_eq!(half_up_sum, Money::from_i64(2));
    }

    #[test]
    fn rejects_share_sum_mismatch() {
        let exact = vec![dec("10"), dec("20")];
        let result = quantize_shares(&exact, Money::from_i64(100), CurrencyContext::idr_default());
        assert!(matches!(
            result,
            Err(ShareRoundingError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn rejects_non_integral_total() {
        let exact = vec![dec("0.25"), dec("0.25")];
        let result = quantize_shares(
            &exact,
            Money::from_decimal(dec("0.5")),
            CurrencyContext::idr_default(),
        );
        assert_eq!(result, Err(ShareRoundingError::NonIntegralTotal));
    }

    #[test]
    fn empty_share_list_requires_zero_total() {
        assert_eq!(
            quantize_shares(&[], Money::ZERO, CurrencyContext::idr_default()),
            Ok(Vec::new())
        );
        assert!(matches!(
            quantize_shares(&[], Money::from_i64(10), CurrencyContext::idr_default()),
            Err(ShareRoundingError::TotalMismatch { .. })
        ));
    }

    #[test]
    fn usd_scale_quantizes_to_cents() {
        let context = CurrencyContext {
            scale: 2,
            rounding_mode: RoundingMode::HalfUp,
        };
        let exact = vec![dec("3.333333"), dec("3.333333"), dec("3.333334")];
        let rounded = quantize_shares(&exact, Money::from_i64(10), context)
            .expect("quantization should succeed");

        let sum: Money = rounded.iter().sum();
        assert_eq!(sum, Money::from_i64(10));
        assert_eq!(rounded[2], Money::from_decimal(dec("3.34")));
    }

    proptest! {
        #[test]
        fn equal_shares_always_sum_to_total(
            total in 1i64..1_000_000_000,
            count in 1usize..24,
        ) {
            let exact_share = Decimal::from(total) / Decimal::from(count as i64);
            let exact: Vec<Decimal> = vec![exact_share; count];

            let rounded = quantize_shares(
                &exact,
                Money::from_i64(total),
                CurrencyContext::idr_default(),
            )
            .expect("quantization should succeed");

            let sum: Money = rounded.iter().sum();
            prop_assert_eq!(sum, Money::from_i64(total));
            for share in &rounded {
                let deviation = (share.as_decimal() - exact_share).abs();
                prop_assert!(deviation <= Decimal::ONE);
            }
        }
    }
}
