pub mod cache;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod normalize;
pub mod pipeline;
pub mod resolver;
pub mod sections;
pub mod singleflight;
pub mod world;

pub use config::UpstreamConfig;
pub use errors::UpstreamError;
pub use pipeline::Aggregator;
pub use sections::Section;
pub use world::World;
