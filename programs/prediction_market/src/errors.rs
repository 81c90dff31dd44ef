//! Error taxonomy for the market engine
//!
//! Every failure is a local business-rule rejection: nothing is retried and
//! no market state is touched when one of these is returned.

use anchor_lang::prelude::*;

#[error_code]
pub enum MarketError {
    // Caller mistakes
    #[msg("Outcome index is out of range for this market")]
    InvalidOutcome,
    #[msg("Amount must be greater than zero")]
    ZeroAmount,
    #[msg("Market must have between 2 and the configured maximum outcomes")]
    InvalidOutcomeCount,
    #[msg("Question exceeds maximum length")]
    QuestionTooLong,
    #[msg("Initial liquidity below minimum")]
    InsufficientLiquidity,
    #[msg("Pari-mutuel markets take no seed liquidity")]
    UnexpectedLiquidity,
    #[msg("Market not found")]
    MarketNotFound,
    #[msg("A market with this id already exists")]
    MarketAlreadyExists,
    #[msg("Operation is not supported by this market's pricing model")]
    UnsupportedMarketKind,
    #[msg("Engine configuration is invalid")]
    InvalidConfig,

    // Lifecycle conflicts
    #[msg("Market is already resolved, no more bets accepted")]
    MarketResolved,
    #[msg("Market is not resolved yet")]
    NotResolved,
    #[msg("Market has already been resolved")]
    AlreadyResolved,
    #[msg("Only the market oracle can resolve")]
    Unauthorized,
    #[msg("No winnings to claim")]
    NothingToClaim,
    #[msg("Protocol is paused")]
    ProtocolPaused,
    #[msg("Slippage tolerance exceeded")]
    SlippageExceeded,

    // Arithmetic
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
    #[msg("Division by zero")]
    DivisionByZero,

    // Collateral collaborator
    #[msg("Collateral allowance too low for this transfer")]
    InsufficientAllowance,
    #[msg("Collateral balance too low for this transfer")]
    InsufficientBalance,

    // Log replay
    #[msg("Replayed operation does not match the recorded event")]
    ReplayMismatch,
}

/// Assert that `result` failed with `expected`, comparing Anchor error codes.
#[cfg(test)]
pub(crate) fn assert_market_error<T: std::fmt::Debug>(result: Result<T>, expected: MarketError) {
    match result {
        Err(anchor_lang::error::Error::AnchorError(err)) => {
            assert_eq!(
                err.error_code_number,
                u32::from(expected),
                "expected {:?}, got {}",
                expected,
                err.error_name
            );
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}
