//! # CourtListener SDK
//!
//! Async clients for the CourtListener REST API v4 and the eCFR API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courtlistener_sdk::{CourtListenerClient, OpinionSearch, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CourtListenerClient::builder()
//!         .api_key("your-api-token")
//!         .build()?;
//!
//!     let results = client
//!         .search()
//!         .opinions(&OpinionSearch::new("qualified immunity"))
//!         .await?;
//!     println!("Found {} opinions", results.total());
//!
//!     let roe = client.citations().lookup("410 U.S. 113").await?;
//!     println!("{} citation(s) resolved", roe.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Regulations
//!
//! ```rust,no_run
//! use courtlistener_sdk::{EcfrClient, Hierarchy};
//!
//! # async fn example() -> courtlistener_sdk::Result<()> {
//! let ecfr = EcfrClient::builder().build()?;
//! let section = ecfr
//!     .source_document(29, None, &Hierarchy::for_section("1910.1200"))
//!     .await?;
//! println!("{}", section.full_text());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod ecfr;
pub mod error;
pub mod transport;

pub use api::{AudioSearch, DocketSearch, OpinionSearch, PeopleSearch, RecapSearch, SemanticSearch};
pub use client::{CourtListenerClient, CourtListenerClientBuilder};
pub use config::{ClientConfig, RateLimitConfig};
pub use ecfr::{EcfrClient, EcfrClientBuilder, Hierarchy, RegulationSearch};
pub use error::{Error, Result};

// Re-export core types for convenience
pub use courtlistener_core::{
    Audio, CitationLookupResult, Cluster, Court, Docket, Opinion, Person, RegulationDocument,
    RegulationNode, SearchHit, SearchResponse,
};
