use anchor_lang::prelude::*;

use crate::{DiceError, BET_SEED, REFUND_TIMEOUT_SLOTS};

/// A single wager held in escrow until it is resolved or refunded.
///
/// The account lamports are rent plus `wager`. The serialized fields are
/// the exact message the house signs, so field order is part of the
/// protocol.
#[account]
#[derive(Debug)]
pub struct Bet {
    pub seed: u128,        // 16
    pub player: Pubkey,    // 32
    pub house: Pubkey,     // 32
    pub roll_target: u8,   // 1
    pub wager: u64,        // 8
    pub created_at: u64,   // 8 (slot)
}

impl Bet {
    pub const SIZE: usize = 16 + 32 + 32 + 1 + 8 + 8;

    /// A freshly allocated bet account is all zeroes; an admitted one
    /// always carries a non-zero wager.
    pub fn is_open(&self) -> bool {
        self.wager > 0
    }

    /// Read the open bet stored at `info`, which must be the bet PDA of
    /// `vault`.
    ///
    /// Closed accounts are handed back to the system program with no data,
    /// so every way of not finding a live bet here is `BetNotFound`.
    pub fn load_open(info: &AccountInfo, vault: &Pubkey) -> Result<Bet> {
        require!(
            info.owner == &crate::ID && !info.data_is_empty(),
            DiceError::BetNotFound
        );

        let bet = {
            let data = info.try_borrow_data()?;
            Bet::try_deserialize(&mut &data[..]).map_err(|_| error!(DiceError::BetNotFound))?
        };

        let (expected, _) = Pubkey::find_program_address(
            &[BET_SEED, vault.as_ref(), bet.seed.to_le_bytes().as_ref()],
            &crate::ID,
        );
        require_keys_eq!(expected, *info.key, DiceError::BetNotFound);
        require!(bet.is_open(), DiceError::BetNotFound);

        Ok(bet)
    }

    /// Bytes the house signs to reveal the roll (account data minus the
    /// discriminator).
    pub fn to_message(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..16].copy_from_slice(&self.seed.to_le_bytes());
        out[16..48].copy_from_slice(self.player.as_ref());
        out[48..80].copy_from_slice(self.house.as_ref());
        out[80] = self.roll_target;
        out[81..89].copy_from_slice(&self.wager.to_le_bytes());
        out[89..97].copy_from_slice(&self.created_at.to_le_bytes());
        out
    }

    /// First slot at which the player may reclaim the wager.
    pub fn refundable_at(&self) -> Result<u64> {
        Ok(self
            .created_at
            .checked_add(REFUND_TIMEOUT_SLOTS)
            .ok_or(DiceError::Overflow)?)
    }

    pub fn check_refundable(&self, slot: u64) -> Result<()> {
        require!(slot >= self.refundable_at()?, DiceError::TooEarly);
        Ok(())
    }

    /// The house may only reveal once the bet's slot has passed.
    ///
    /// A seed can be reused after its bet closes. Closing strictly after
    /// `created_at` means a re-placed bet always gets a later `created_at`,
    /// so it never has the same bytes (and signature) as a revealed one.
    pub fn check_resolvable(&self, slot: u64) -> Result<()> {
        require!(slot > self.created_at, DiceError::ResolveTooEarly);
        Ok(())
    }
}
