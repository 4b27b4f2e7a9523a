use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Transfer};

use crate::{DiceError, House, HouseInitialized, HOUSE_SEED, VAULT_SEED};

/// Create the house ledger and fund the vault
pub fn handler(ctx: Context<Initialize>, bankroll: u64) -> Result<()> {
    require!(
        !ctx.accounts.house_account.is_initialized(),
        DiceError::AlreadyInitialized
    );

    // An empty vault must end up rent exempt
    let rent_floor = Rent::get()?.minimum_balance(0);
    let funded = ctx
        .accounts
        .vault
        .to_account_info()
        .lamports()
        .checked_add(bankroll)
        .ok_or(DiceError::Overflow)?;
    require!(funded >= rent_floor, DiceError::BankrollTooSmall);

    if bankroll > 0 {
        let cpi_accounts = Transfer {
            from: ctx.accounts.house.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
        };
        let cpi_ctx = CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            cpi_accounts,
        );
        system_program::transfer(cpi_ctx, bankroll)?;
    }

    let house_account = &mut ctx.accounts.house_account;
    house_account.set_inner(House {
        authority: ctx.accounts.house.key(),
        vault_bump: ctx.bumps.vault,
        bump: ctx.bumps.house_account,
        outstanding_liability: 0,
        open_bets: 0,
        bets_placed: 0,
        total_wagered: 0,
        total_paid_out: 0,
    });

    emit!(HouseInitialized {
        authority: ctx.accounts.house.key(),
        vault: ctx.accounts.vault.key(),
        bankroll,
    });

    msg!("House initialized with bankroll {}", bankroll);
    Ok(())
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub house: Signer<'info>,

    #[account(
        init_if_needed,
        payer = house,
        space = 8 + House::SIZE,
        seeds = [HOUSE_SEED, house.key().as_ref()],
        bump
    )]
    pub house_account: Account<'info, House>,

    #[account(
        mut,
        seeds = [VAULT_SEED, house.key().as_ref()],
        bump
    )]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
