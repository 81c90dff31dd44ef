//! # Market-Making Math
//!
//! Pure functions over pool numbers, no market state:
//!
//! ```text
//!   fixed_point       wad arithmetic, 256-bit mul/div, decimal scaling
//!        │
//!        ├── constant_product   Π r_i preserved per bet, bet pricing
//!        ├── reserve_value      value_i · r_i per outcome, exact-share pricing
//!        ├── pari_mutuel        proportional payouts
//!        └── probability        reserves / stakes → odds
//! ```

pub mod constant_product;
pub mod fixed_point;
pub mod pari_mutuel;
pub mod probability;
pub mod reserve_value;

pub use constant_product::*;
pub use pari_mutuel::*;
pub use probability::*;
pub use reserve_value::*;
