//! Research capabilities as agent tools
//!
//! - [`registry`](crate::tools::registry) - `Tool` trait and name-keyed registry
//! - [`research`](crate::tools::research) - the session-backed tools and the
//!   registries built from them
//!
//! Each agent loop gets an explicitly composed registry:
//! ```ignore
//! let session = Arc::new(ResearchSession::connect(config).await?);
//! let assistant = research::assistant_registry(&session);
//! let status = assistant
//!     .execute("fetch_online_doc", json!({"url": "https://example.com"}))
//!     .await?;
//! ```

/// Tool registry for managing available tools.
pub mod registry;
/// Tools backed by a research session.
pub mod research;

pub use registry::{Tool, ToolRegistry};
pub use research::{assistant_registry, assistant_system_prompt, intent_registry};
