//! One module per upstream. Each exposes a probe built from [`SmokeConfig`].
//!
//! [`SmokeConfig`]: smoke_config::SmokeConfig
pub mod hackernews;
pub mod huggingface;
pub mod newsapi;
pub mod reddit;
pub mod stackexchange;
pub mod twitter;
pub mod youtube;

pub use hackernews::HackerNewsProbe;
pub use huggingface::HuggingFaceProbe;
pub use newsapi::NewsApiProbe;
pub use reddit::RedditProbe;
pub use stackexchange::StackExchangeProbe;
pub use twitter::TwitterProbe;
pub use youtube::YouTubeProbe;
