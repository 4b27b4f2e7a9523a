use anchor_lang::prelude::*;

use crate::DiceError;

// ============================================================================
// HOUSE - Bankroll Ledger
// ============================================================================
//
// The vault itself is a bare system account holding lamports, so the
// liability backing open bets is tracked here. `outstanding_liability` is the
// sum of `max_payout` over every open bet of this house and moves atomically
// with each admission and terminal transition.
// ============================================================================

#[account]
pub struct House {
    pub authority: Pubkey,          // 32
    pub vault_bump: u8,             // 1
    pub bump: u8,                   // 1
    pub outstanding_liability: u64, // 8
    pub open_bets: u64,             // 8
    pub bets_placed: u64,           // 8
    pub total_wagered: u64,         // 8
    pub total_paid_out: u64,        // 8
}

impl House {
    pub const SIZE: usize = 32 + 1 + 1 + 8 + 8 + 8 + 8 + 8;

    /// `init_if_needed` hands back a zeroed record the first time.
    pub fn is_initialized(&self) -> bool {
        self.authority != Pubkey::default()
    }

    /// Reserve `max_payout` of the vault for a new bet.
    ///
    /// `vault_available` is the vault balance the house may pay out from,
    /// i.e. lamports above the rent-exempt minimum.
    pub fn admit(&mut self, vault_available: u64, wager: u64, max_payout: u64) -> Result<()> {
        let required = self
            .outstanding_liability
            .checked_add(max_payout)
            .ok_or(DiceError::Overflow)?;
        require!(
            vault_available >= required,
            DiceError::InsufficientLiquidity
        );

        self.outstanding_liability = required;
        self.open_bets = self.open_bets.checked_add(1).ok_or(DiceError::Overflow)?;
        self.bets_placed = self.bets_placed.checked_add(1).ok_or(DiceError::Overflow)?;
        self.total_wagered = self
            .total_wagered
            .checked_add(wager)
            .ok_or(DiceError::Overflow)?;
        Ok(())
    }

    /// Drop the reservation of a bet leaving the open set.
    pub fn release(&mut self, max_payout: u64, paid_out: u64) -> Result<()> {
        self.outstanding_liability = self
            .outstanding_liability
            .checked_sub(max_payout)
            .ok_or(DiceError::Overflow)?;
        self.open_bets = self.open_bets.checked_sub(1).ok_or(DiceError::Overflow)?;
        self.total_paid_out = self
            .total_paid_out
            .checked_add(paid_out)
            .ok_or(DiceError::Overflow)?;
        Ok(())
    }
}
