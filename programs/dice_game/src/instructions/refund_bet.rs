use anchor_lang::prelude::*;

use crate::instructions::move_lamports;
use crate::settlement::max_payout;
use crate::{Bet, BetRefunded, DiceError, House, HOUSE_SEED, VAULT_SEED};

/// Return the wager of a bet the house left unresolved past the timeout
pub fn handler(ctx: Context<RefundBet>) -> Result<()> {
    let bet_info = ctx.accounts.bet.to_account_info();
    let bet = Bet::load_open(&bet_info, &ctx.accounts.vault.key())?;
    require_keys_eq!(bet.house, ctx.accounts.house.key(), DiceError::HouseMismatch);
    require_keys_eq!(bet.player, ctx.accounts.player.key(), DiceError::PlayerMismatch);

    let slot = Clock::get()?.slot;
    bet.check_refundable(slot)?;

    let reserved = max_payout(bet.wager, bet.roll_target)?;

    move_lamports(&bet_info, &ctx.accounts.player.to_account_info(), bet.wager)?;
    anchor_lang::common::close(bet_info, ctx.accounts.player.to_account_info())?;

    ctx.accounts.house_account.release(reserved, 0)?;

    emit!(BetRefunded {
        bet: ctx.accounts.bet.key(),
        player: bet.player,
        house: bet.house,
        seed: bet.seed,
        wager: bet.wager,
        slot,
    });

    msg!("Bet refunded: {} lamports at slot {}", bet.wager, slot);
    Ok(())
}

#[derive(Accounts)]
pub struct RefundBet<'info> {
    #[account(mut)]
    pub player: Signer<'info>,

    /// CHECK: House authority, only used to derive the house PDAs
    pub house: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [HOUSE_SEED, house.key().as_ref()],
        bump = house_account.bump
    )]
    pub house_account: Account<'info, House>,

    #[account(
        seeds = [VAULT_SEED, house.key().as_ref()],
        bump = house_account.vault_bump
    )]
    pub vault: SystemAccount<'info>,

    /// CHECK: Loaded by `Bet::load_open`, which checks owner, discriminator
    /// and PDA so a closed bet reports `BetNotFound`
    #[account(mut)]
    pub bet: UncheckedAccount<'info>,
}
