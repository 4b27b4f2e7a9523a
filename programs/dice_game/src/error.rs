use anchor_lang::prelude::*;

#[error_code]
pub enum DiceError {
    #[msg("Math overflow")]
    Overflow,

    // --- validation ---
    #[msg("Roll target must be between 1 and 99")]
    InvalidTarget,
    #[msg("Wager must be greater than zero")]
    InvalidWager,
    #[msg("Bankroll below the vault's rent-exempt minimum")]
    BankrollTooSmall,

    // --- liquidity ---
    #[msg("Vault cannot cover the maximum payout of this bet")]
    InsufficientLiquidity,

    // --- authorization ---
    #[msg("Bet belongs to a different house")]
    HouseMismatch,
    #[msg("Bet belongs to a different player")]
    PlayerMismatch,
    #[msg("Missing or invalid Ed25519 signature proof")]
    MissingOrInvalidSignature,

    // --- temporal ---
    #[msg("Refund timeout has not elapsed")]
    TooEarly,
    #[msg("Bet cannot be resolved in the slot it was placed")]
    ResolveTooEarly,

    // --- state ---
    #[msg("House already initialized")]
    AlreadyInitialized,
    #[msg("A bet with this seed is already open on this vault")]
    DuplicateSeed,
    #[msg("Bet not found or already closed")]
    BetNotFound,
}
