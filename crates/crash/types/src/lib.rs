//! Crash Types - Core types for crash game outcome tracking
//!
//! Shared by the analysis engine and the tracking daemon.
//!
//! ## Key Concepts
//!
//! - **Outcome**: A finalized round, identified by its sequence id, with the
//!   multiplier the round crashed at
//! - **GameRecord**: The persisted row for a round, including bet and balance
//!   bookkeeping reported by the betting script
//! - **LiveStatus**: Current script status and balance shown on the dashboard
//! - **DashboardEvent**: Notifications published after every mutation

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod events;
pub mod game;
pub mod ids;
pub mod requests;
pub mod status;

pub use events::{BetPlacedNotice, DashboardEvent, DashboardMessage, GameEndedNotice};
pub use game::{settle_profit, GameRecord, NewGame, Outcome};
pub use ids::GameId;
pub use requests::{
    AddGamesRequest, BetPlacedRequest, GameEndedRequest, ScriptStartedRequest,
    ScriptStoppedRequest,
};
pub use status::{LiveStatus, ScriptStatus, ScriptStatusRecord};
