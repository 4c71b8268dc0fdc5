//! Tavily web search for the corrective-RAG pipeline.
//!
//! [`TavilyClient`] implements [`WebSearch`](crag_retrieval::WebSearch) over
//! the [Tavily API](https://tavily.com/).
//!
//! ```rust,no_run
//! use crag_tavily::{TavilyClient, TavilyConfig};
//! use crag_retrieval::WebSearch;
//!
//! # async fn example() -> Result<(), crag_core::CragError> {
//! let client = TavilyClient::new(TavilyConfig::new("tvly-key").with_max_results(3));
//! for hit in client.search("What is agent memory?").await? {
//!     println!("{}: {}", hit.url, hit.content);
//! }
//! # Ok(())
//! # }
//! ```

mod search;

pub use search::{TavilyClient, TavilyConfig};
