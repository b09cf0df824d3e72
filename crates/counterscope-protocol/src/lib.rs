//! Counterscope Protocol
//!
//! The 1–2-step classification decision procedure, written once
//! against the backend capability surface and polymorphic over
//! provider choice:
//! - `MultiTurnProtocol`: classify the root first, then the reply
//!   conditioned on the root's established label (preferred — skips
//!   the conditioned question when it does not apply)
//! - `SingleShotProtocol`: one self-contained prompt naming both
//!   labels in a single formatted reply
//! - `PairClassifier`: the seam both variants implement

pub mod multi_turn;
pub mod pair;
pub mod prompts;
pub mod single_shot;

pub use multi_turn::MultiTurnProtocol;
pub use pair::{PairClassifier, PairOutcome};
pub use single_shot::SingleShotProtocol;
