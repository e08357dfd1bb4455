//! Strategy definitions.
//!
//! - Strategy identities and strike construction
//! - Alpha signal rules
//! - Intrinsic payoff functions

pub mod kind;
pub mod payoff;
pub mod signal;

pub use kind::{StrategyKind, Strikes};
pub use signal::{generate, generate_all, AlphaSignal};
