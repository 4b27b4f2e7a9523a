use anchor_lang::prelude::*;

use crate::{DiceError, BPS_DENOM, HOUSE_EDGE_BPS, MAX_ROLL_TARGET, MIN_ROLL_TARGET};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Player receives `payout` from the vault; the escrowed wager goes to
    /// the vault.
    Win { payout: u64 },
    /// Escrowed wager goes to the vault.
    Loss,
}

impl Outcome {
    pub fn won(&self) -> bool {
        matches!(self, Outcome::Win { .. })
    }

    pub fn payout(&self) -> u64 {
        match self {
            Outcome::Win { payout } => *payout,
            Outcome::Loss => 0,
        }
    }
}

pub fn validate_terms(roll_target: u8, wager: u64) -> Result<()> {
    require!(
        (MIN_ROLL_TARGET..=MAX_ROLL_TARGET).contains(&roll_target),
        DiceError::InvalidTarget
    );
    require!(wager > 0, DiceError::InvalidWager);
    Ok(())
}

/// Payout of a winning bet.
///
/// A roll below `roll_target` out of 100 pays `100 / roll_target` times the
/// wager, less `HOUSE_EDGE_BPS`:
/// `wager * (BPS_DENOM - HOUSE_EDGE_BPS) / (100 * roll_target)`, floored.
/// This is also the worst case the vault must cover at admission.
pub fn max_payout(wager: u64, roll_target: u8) -> Result<u64> {
    require!(roll_target > 0, DiceError::InvalidTarget);

    let payout = (wager as u128)
        .checked_mul((BPS_DENOM - HOUSE_EDGE_BPS) as u128)
        .ok_or(DiceError::Overflow)?
        .checked_div(100 * roll_target as u128)
        .ok_or(DiceError::Overflow)?;

    u64::try_from(payout).map_err(|_| error!(DiceError::Overflow))
}

/// Cover the vault must reserve to admit a bet.
///
/// A worst case that does not fit in a u64 can never be backed by any
/// vault, so it is a liquidity rejection rather than an arithmetic one.
pub fn required_cover(wager: u64, roll_target: u8) -> Result<u64> {
    let wide = (wager as u128)
        .checked_mul((BPS_DENOM - HOUSE_EDGE_BPS) as u128)
        .ok_or(DiceError::Overflow)?;
    require!(
        wide / (100 * roll_target.max(1) as u128) <= u64::MAX as u128,
        DiceError::InsufficientLiquidity
    );
    max_payout(wager, roll_target)
}

/// Win iff `roll < roll_target`.
pub fn settle(roll_target: u8, wager: u64, roll: u8) -> Result<Outcome> {
    if roll < roll_target {
        Ok(Outcome::Win {
            payout: max_payout(wager, roll_target)?,
        })
    } else {
        Ok(Outcome::Loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

    #[test]
    fn terms_are_checked_in_order() {
        assert_eq!(
            validate_terms(0, 0).unwrap_err(),
            DiceError::InvalidTarget.into()
        );
        assert_eq!(
            validate_terms(100, 10).unwrap_err(),
            DiceError::InvalidTarget.into()
        );
        assert_eq!(
            validate_terms(50, 0).unwrap_err(),
            DiceError::InvalidWager.into()
        );
        validate_terms(1, 1).unwrap();
        validate_terms(99, 1).unwrap();
    }

    #[test]
    fn even_odds_pay_just_under_double() {
        let wager = LAMPORTS_PER_SOL / 10;
        // 0.1 SOL * 9850 / 5000
        assert_eq!(max_payout(wager, 50).unwrap(), 197_000_000);
    }

    #[test]
    fn payout_scales_inversely_with_target() {
        let wager = 1_000_000;
        assert_eq!(max_payout(wager, 1).unwrap(), 98_500_000);
        assert_eq!(max_payout(wager, 25).unwrap(), 3_940_000);
        // a near-certain win returns less than the wager
        assert_eq!(max_payout(wager, 99).unwrap(), 994_949);
    }

    #[test]
    fn payout_rounds_down() {
        // 7 * 9850 / 300 = 229.83
        assert_eq!(max_payout(7, 3).unwrap(), 229);
    }

    #[test]
    fn payout_overflow_is_an_error() {
        assert_eq!(
            max_payout(u64::MAX, 1).unwrap_err(),
            DiceError::Overflow.into()
        );
        // large wagers are fine while the result fits
        assert!(max_payout(u64::MAX, 99).is_ok());
    }

    #[test]
    fn uncoverable_worst_case_is_a_liquidity_rejection() {
        // 3.63e19 lamports at target 1, above u64::MAX
        assert_eq!(
            required_cover(u64::MAX / 50, 1).unwrap_err(),
            DiceError::InsufficientLiquidity.into()
        );
        assert_eq!(
            required_cover(u64::MAX, 1).unwrap_err(),
            DiceError::InsufficientLiquidity.into()
        );
        assert_eq!(
            required_cover(1_000_000, 25).unwrap(),
            max_payout(1_000_000, 25).unwrap()
        );
    }

    #[test]
    fn win_is_strictly_below_target() {
        let wager = 1_000;
        assert_eq!(
            settle(50, wager, 49).unwrap(),
            Outcome::Win { payout: 1_970 }
        );
        assert_eq!(settle(50, wager, 50).unwrap(), Outcome::Loss);
        assert_eq!(settle(50, wager, 99).unwrap(), Outcome::Loss);
        assert!(settle(1, wager, 0).unwrap().won());
        assert!(!settle(1, wager, 1).unwrap().won());
    }

    #[test]
    fn each_roll_has_exactly_one_outcome() {
        let wager = 10_000;
        for target in MIN_ROLL_TARGET..=MAX_ROLL_TARGET {
            let wins = (0..100u8)
                .filter(|roll| settle(target, wager, *roll).unwrap().won())
                .count();
            assert_eq!(wins, target as usize);
        }
    }

    #[test]
    fn loss_pays_nothing() {
        assert_eq!(Outcome::Loss.payout(), 0);
        assert_eq!(Outcome::Win { payout: 5 }.payout(), 5);
    }
}
