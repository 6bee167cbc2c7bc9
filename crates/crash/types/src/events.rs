//! Dashboard notifications
//!
//! Every mutation accepted by the daemon is published as a [`DashboardEvent`].
//! Connected dashboards receive the flattened [`DashboardMessage`] form.

use crate::{GameId, LiveStatus, ScriptStatus};
use serde::{Deserialize, Serialize};

/// Bet details echoed to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetPlacedNotice {
    pub attempted_bet_amount: f64,
    pub real_bet_amount: f64,
    pub payout: f64,
}

/// Settlement details echoed to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEndedNotice {
    pub game_id: GameId,
    pub crash_value: f64,
    pub profit: f64,
}

/// Events published after state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// Current state, sent to a dashboard when it connects
    Snapshot(LiveStatus),

    /// The betting script reported that it started
    ScriptStarted {
        status: ScriptStatus,
        balance: f64,
    },

    /// The betting script reported that it stopped
    ScriptStopped { status: ScriptStatus },

    /// A bet was placed on an open round
    BetPlaced {
        status: ScriptStatus,
        balance: f64,
        bet: BetPlacedNotice,
    },

    /// A new balance arrived ahead of a settlement
    BalanceUpdated { balance: f64 },

    /// A round was settled
    GameEnded {
        balance: f64,
        game: GameEndedNotice,
    },
}

impl DashboardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardEvent::Snapshot(_) => "snapshot",
            DashboardEvent::ScriptStarted { .. } => "script_started",
            DashboardEvent::ScriptStopped { .. } => "script_stopped",
            DashboardEvent::BetPlaced { .. } => "bet_placed",
            DashboardEvent::BalanceUpdated { .. } => "balance_updated",
            DashboardEvent::GameEnded { .. } => "game_ended",
        }
    }
}

/// Wire shape read by the dashboard; absent keys are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMessage {
    #[serde(rename = "scriptStatus", skip_serializing_if = "Option::is_none")]
    pub script_status: Option<ScriptStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bet_placed: Option<BetPlacedNotice>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_ended: Option<GameEndedNotice>,
}

impl From<&DashboardEvent> for DashboardMessage {
    fn from(event: &DashboardEvent) -> Self {
        match event {
            DashboardEvent::Snapshot(live) => Self {
                script_status: Some(live.script_status.clone()),
                balance: Some(live.balance),
                ..Default::default()
            },
            DashboardEvent::ScriptStarted { status, balance } => Self {
                script_status: Some(status.clone()),
                balance: Some(*balance),
                ..Default::default()
            },
            DashboardEvent::ScriptStopped { status } => Self {
                script_status: Some(status.clone()),
                ..Default::default()
            },
            DashboardEvent::BetPlaced {
                status,
                balance,
                bet,
            } => Self {
                script_status: Some(status.clone()),
                balance: Some(*balance),
                bet_placed: Some(bet.clone()),
                ..Default::default()
            },
            DashboardEvent::BalanceUpdated { balance } => Self {
                balance: Some(*balance),
                ..Default::default()
            },
            DashboardEvent::GameEnded { balance, game } => Self {
                balance: Some(*balance),
                game_ended: Some(game.clone()),
                ..Default::default()
            },
        }
    }
}
