//! Storage collaborator interfaces
//!
//! The core only needs to look up a site, persist its favicon fields and
//! count feedback per site. Relational persistence lives in the surrounding
//! application; the in-memory implementations back tests and the CLI.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryFeedbackRepository, InMemorySiteRepository};
pub use traits::{FeedbackRepository, SiteRepository};
