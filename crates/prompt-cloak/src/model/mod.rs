//! Data model types.
//!
//! - Payload (the hidden record) and its parts
//! - Builder (payload construction from claim codes)

pub mod builder;
pub mod payload;

pub use builder::PayloadBuilder;
pub use payload::{GeoPoint, Payload, Reward, RewardKind};
