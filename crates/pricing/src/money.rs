//! Integer money arithmetic.
//!
//! All prices are minor currency units (`Amount` = i64). Division rounds
//! half-up: ties go toward positive infinity, so 249.5 rounds to 250.

use mentora_core::Amount;

/// Compute `numer / denom` rounded half-up. `denom` must be positive.
pub fn round_half_up_ratio(numer: Amount, denom: Amount) -> Amount {
    debug_assert!(denom > 0, "denominator must be positive");
    (2 * numer + denom).div_euclid(2 * denom)
}

/// Percentage of an amount, rounded half-up.
pub fn percentage_of(amount: Amount, percent: u32) -> Amount {
    round_half_up_ratio(amount * Amount::from(percent), 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_rounds_up() {
        // 499 * 50% = 249.5 -> 250
        assert_eq!(percentage_of(499, 50), 250);
        assert_eq!(round_half_up_ratio(5, 10), 1);
        assert_eq!(round_half_up_ratio(4, 10), 0);
    }

    #[test]
    fn exact_divisions_are_untouched() {
        assert_eq!(percentage_of(500, 50), 250);
        assert_eq!(percentage_of(100, 100), 100);
        assert_eq!(percentage_of(100, 0), 0);
    }

    #[test]
    fn negative_ties_round_toward_positive_infinity() {
        // -0.5 -> 0 under half-up semantics.
        assert_eq!(round_half_up_ratio(-5, 10), 0);
        assert_eq!(round_half_up_ratio(-6, 10), -1);
    }
}
