use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions as sysvar_instructions;
use anchor_lang::system_program::{self, Transfer};

use crate::instructions::move_lamports;
use crate::randomness::{
    derive_roll, load_previous_instruction, verify_signature_proof, SIGNATURE_LEN,
};
use crate::settlement::{max_payout, settle, Outcome};
use crate::{Bet, BetResolved, DiceError, House, HOUSE_SEED, VAULT_SEED};

/// Reveal the roll from the house signature and settle the bet
///
/// Win: vault pays `payout` to the player and keeps the escrowed wager.
/// Loss: escrowed wager goes to the vault.
/// Either way the bet closes and its rent goes back to the player.
pub fn handler(ctx: Context<ResolveBet>, signature: [u8; SIGNATURE_LEN]) -> Result<()> {
    let bet_info = ctx.accounts.bet.to_account_info();
    let bet = Bet::load_open(&bet_info, &ctx.accounts.vault.key())?;
    require_keys_eq!(bet.house, ctx.accounts.house.key(), DiceError::HouseMismatch);
    require_keys_eq!(bet.player, ctx.accounts.player.key(), DiceError::PlayerMismatch);
    bet.check_resolvable(Clock::get()?.slot)?;

    let proof = load_previous_instruction(&ctx.accounts.instructions_sysvar.to_account_info())?;
    verify_signature_proof(
        &proof,
        &ctx.accounts.house.key(),
        &bet.to_message(),
        &signature,
    )?;

    let roll = derive_roll(&signature);
    let outcome = settle(bet.roll_target, bet.wager, roll)?;
    let reserved = max_payout(bet.wager, bet.roll_target)?;

    if let Outcome::Win { payout } = outcome {
        if payout > 0 {
            let house_key = ctx.accounts.house.key();
            let seeds: &[&[&[u8]]] = &[&[
                VAULT_SEED,
                house_key.as_ref(),
                &[ctx.accounts.house_account.vault_bump],
            ]];
            let cpi_accounts = Transfer {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.player.to_account_info(),
            };
            let cpi_ctx = CpiContext::new_with_signer(
                ctx.accounts.system_program.to_account_info(),
                cpi_accounts,
                seeds,
            );
            system_program::transfer(cpi_ctx, payout)?;
        }
    }

    // Escrowed wager belongs to the vault on both branches
    move_lamports(&bet_info, &ctx.accounts.vault.to_account_info(), bet.wager)?;
    // Remaining rent goes back to the player who paid it
    anchor_lang::common::close(bet_info, ctx.accounts.player.to_account_info())?;

    ctx.accounts
        .house_account
        .release(reserved, outcome.payout())?;

    emit!(BetResolved {
        bet: ctx.accounts.bet.key(),
        player: bet.player,
        house: bet.house,
        seed: bet.seed,
        roll,
        roll_target: bet.roll_target,
        won: outcome.won(),
        wager: bet.wager,
        payout: outcome.payout(),
    });

    msg!(
        "Bet resolved: roll {} under {} -> {}",
        roll,
        bet.roll_target,
        if outcome.won() { "win" } else { "loss" }
    );
    Ok(())
}

#[derive(Accounts)]
pub struct ResolveBet<'info> {
    pub house: Signer<'info>,

    /// CHECK: Receives the payout and the bet rent; must be the bet's player
    #[account(mut)]
    pub player: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [HOUSE_SEED, house.key().as_ref()],
        bump = house_account.bump
    )]
    pub house_account: Account<'info, House>,

    #[account(
        mut,
        seeds = [VAULT_SEED, house.key().as_ref()],
        bump = house_account.vault_bump
    )]
    pub vault: SystemAccount<'info>,

    /// CHECK: Loaded by `Bet::load_open`, which checks owner, discriminator
    /// and PDA so a closed bet reports `BetNotFound`
    #[account(mut)]
    pub bet: UncheckedAccount<'info>,

    /// CHECK: Instructions sysvar, address checked
    #[account(address = sysvar_instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
