pub mod clock;
pub mod core;
pub mod mock;
pub mod model_files;
pub mod observability;
pub mod redis_cache;
pub mod yahoo;

pub use clock::SystemClock;
pub use model_files::FileArtifactSource;
pub use redis_cache::RedisRemoteCache;
pub use yahoo::YahooMarketDataService;
