//! API request handlers

mod analysis;
mod events;
mod games;
mod health;
mod script;
mod transfer;

pub use analysis::*;
pub use events::*;
pub use games::*;
pub use health::*;
pub use script::*;
pub use transfer::*;

use serde::{Deserialize, Serialize};

/// Acknowledgement body for mutations
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
