pub mod local_tier;
pub mod two_tier_cache;

pub use local_tier::{LocalLookup, LocalTier};
pub use two_tier_cache::{RemoteLookup, TwoTierCache};
