use anchor_lang::prelude::*;

use crate::DiceError;

pub mod initialize;
pub mod place_bet;
pub mod refund_bet;
pub mod resolve_bet;

pub use initialize::*;
pub use place_bet::*;
pub use refund_bet::*;
pub use resolve_bet::*;

/// Move lamports out of a program-owned account without a CPI.
pub(crate) fn move_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> Result<()> {
    let mut from_lamports = from.try_borrow_mut_lamports()?;
    let mut to_lamports = to.try_borrow_mut_lamports()?;
    **from_lamports = from_lamports
        .checked_sub(amount)
        .ok_or(DiceError::Overflow)?;
    **to_lamports = to_lamports
        .checked_add(amount)
        .ok_or(DiceError::Overflow)?;
    Ok(())
}

/// Lamports the vault can pay out while staying rent exempt.
pub(crate) fn vault_available(vault: &AccountInfo) -> Result<u64> {
    let rent_floor = Rent::get()?.minimum_balance(0);
    Ok(vault.lamports().saturating_sub(rent_floor))
}
