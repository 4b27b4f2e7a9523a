use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

use crate::instructions::vault_available;
use crate::settlement::{required_cover, validate_terms};
use crate::{Bet, BetPlaced, DiceError, House, BET_SEED, HOUSE_SEED, VAULT_SEED};

/// Open a bet and escrow the wager
///
/// Checks run in order: target, wager, seed collision, vault liquidity.
pub fn handler(ctx: Context<PlaceBet>, seed: u128, roll_target: u8, wager: u64) -> Result<()> {
    validate_terms(roll_target, wager)?;
    require!(!ctx.accounts.bet.is_open(), DiceError::DuplicateSeed);

    let max_payout = required_cover(wager, roll_target)?;
    let available = vault_available(&ctx.accounts.vault.to_account_info())?;
    ctx.accounts
        .house_account
        .admit(available, wager, max_payout)?;

    let slot = Clock::get()?.slot;
    ctx.accounts.bet.set_inner(Bet {
        seed,
        player: ctx.accounts.player.key(),
        house: ctx.accounts.house.key(),
        roll_target,
        wager,
        created_at: slot,
    });

    // Player -> bet escrow
    let cpi_accounts = Transfer {
        from: ctx.accounts.player.to_account_info(),
        to: ctx.accounts.bet.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(
        ctx.accounts.system_program.to_account_info(),
        cpi_accounts,
    );
    system_program::transfer(cpi_ctx, wager)?;

    emit!(BetPlaced {
        bet: ctx.accounts.bet.key(),
        player: ctx.accounts.player.key(),
        house: ctx.accounts.house.key(),
        seed,
        roll_target,
        wager,
        max_payout,
        slot,
    });

    msg!(
        "Bet placed: wager {} under {}, liability now {}",
        wager,
        roll_target,
        ctx.accounts.house_account.outstanding_liability
    );
    Ok(())
}

#[derive(Accounts)]
#[instruction(seed: u128)]
pub struct PlaceBet<'info> {
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

    // init_if_needed so a live seed surfaces as DuplicateSeed
    #[account(
        init_if_needed,
        payer = player,
        space = 8 + Bet::SIZE,
        seeds = [BET_SEED, vault.key().as_ref(), seed.to_le_bytes().as_ref()],
        bump
    )]
    pub bet: Account<'info, Bet>,

    pub system_program: Program<'info, System>,
}
