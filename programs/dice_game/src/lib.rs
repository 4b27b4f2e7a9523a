// ======================================================================
// DICE GAME - House-Banked Provably-Fair Dice Ledger
// ======================================================================
// Bet lifecycle:
//   initialize  -> House record + funded Vault PDA
//   place_bet   -> Bet escrow PDA, liquidity reserved against the Vault
//   resolve_bet -> Ed25519 reveal from the house, roll derived, settled
//   refund_bet  -> wager returned to the player after the timeout
//
// PDA Seeds:
// - House: ["house", authority]
// - Vault: ["vault", authority]
// - Bet:   ["bet", vault, seed (u128 LE)]
// ======================================================================

#![allow(
    unexpected_cfgs, // Anchor uses cfg(feature = "anchor-debug")
    elided_lifetimes_in_paths, // Anchor Context pattern uses hidden lifetimes
    ambiguous_glob_reexports, // every instruction module exports `handler`
)]

use anchor_lang::prelude::*;

pub mod instructions;
pub mod randomness;
pub mod settlement;
pub mod state;

pub use instructions::*;
pub use state::*;

declare_id!("EG1cYnJdcUbTqpqZN6CW1TFebS91GgmQJ89TWAcx5N5A");

// ======================================================================
// CONSTANTS / SEEDS
// ======================================================================

pub const BPS_DENOM: u64 = 10_000;

/// House edge taken out of every winning payout.
pub const HOUSE_EDGE_BPS: u64 = 150; // 1.5%

/// Slots a bet must wait before the player may reclaim it.
pub const REFUND_TIMEOUT_SLOTS: u64 = 1_000; // ~400s at 400ms slots

pub const MIN_ROLL_TARGET: u8 = 1;
pub const MAX_ROLL_TARGET: u8 = 99;

// seeds
pub const HOUSE_SEED: &[u8] = b"house";
pub const VAULT_SEED: &[u8] = b"vault";
pub const BET_SEED: &[u8] = b"bet";

// ======================================================================
// EVENTS
// ======================================================================

#[event]
pub struct HouseInitialized {
    pub authority: Pubkey,
    pub vault: Pubkey,
    pub bankroll: u64,
}

#[event]
pub struct BetPlaced {
    pub bet: Pubkey,
    pub player: Pubkey,
    pub house: Pubkey,
    pub seed: u128,
    pub roll_target: u8,
    pub wager: u64,
    pub max_payout: u64,
    pub slot: u64,
}

#[event]
pub struct BetResolved {
    pub bet: Pubkey,
    pub player: Pubkey,
    pub house: Pubkey,
    pub seed: u128,
    pub roll: u8,
    pub roll_target: u8,
    pub won: bool,
    pub wager: u64,
    pub payout: u64,
}

#[event]
pub struct BetRefunded {
    pub bet: Pubkey,
    pub player: Pubkey,
    pub house: Pubkey,
    pub seed: u128,
    pub wager: u64,
    pub slot: u64,
}

// ======================================================================
// ERRORS
// ======================================================================

pub mod error;
pub use error::DiceError;

// ======================================================================
// PROGRAM
// ======================================================================

#[program]
pub mod dice_game {
    use super::*;

    /// Create the house record and fund its vault with `bankroll` lamports.
    ///
    /// # Errors
    /// - `DiceError::AlreadyInitialized` if this authority already has a house
    /// - `DiceError::BankrollTooSmall` if the vault could not be rent exempt
    pub fn initialize(ctx: Context<Initialize>, bankroll: u64) -> Result<()> {
        instructions::initialize::handler(ctx, bankroll)
    }

    /// Open a bet that `roll` will land strictly below `roll_target`.
    ///
    /// * `seed` - player-chosen commitment, unique per vault while open
    /// * `roll_target` - 1..=99
    /// * `wager` - lamports moved into the bet escrow
    pub fn place_bet(
        ctx: Context<PlaceBet>,
        seed: u128,
        roll_target: u8,
        wager: u64,
    ) -> Result<()> {
        instructions::place_bet::handler(ctx, seed, roll_target, wager)
    }

    /// Settle a bet with the house's Ed25519 signature over the bet bytes.
    ///
    /// The Ed25519 native program instruction verifying `signature` must be
    /// the instruction immediately before this one.
    pub fn resolve_bet(ctx: Context<ResolveBet>, signature: [u8; 64]) -> Result<()> {
        instructions::resolve_bet::handler(ctx, signature)
    }

    /// Reclaim the wager of a bet the house never resolved.
    pub fn refund_bet(ctx: Context<RefundBet>) -> Result<()> {
        instructions::refund_bet::handler(ctx)
    }
}
