//! Execute handlers for the CL8Y Toll Bridge contract.
//!
//! This module contains all execute message handlers, organized by category:
//! - `outgoing` - Fee-verified transfers, messages and broadcasts
//! - `incoming` - Operator claims (with fee rebates), recorded entitlements
//!   and their redemption, and message relay
//! - `config` - Fee verifier, operator, config and fee withdrawal management
//! - `admin` - Pause, unpause and admin transfer

mod admin;
mod config;
mod incoming;
mod outgoing;

pub use admin::*;
pub use config::{
    execute_add_fee_verifier, execute_add_operator, execute_remove_fee_verifier,
    execute_remove_operator, execute_update_config, execute_withdraw_fees,
};
pub use incoming::*;
pub use outgoing::*;
