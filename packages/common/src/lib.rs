//! Common - Shared Types for CL8Y Toll Bridge Contracts
//!
//! This package provides the asset descriptors used by admin and fee payout
//! paths, and the receiver interface that contracts implement to accept
//! messages relayed by the bridge.

pub mod asset;
pub mod receiver;

pub use asset::{Asset, AssetInfo};
pub use receiver::{BridgeMessage, BridgeReceiverMsg};
