pub mod collection;
pub mod link;

pub use collection::{share_slug, Collection};
pub use link::{EnrichmentResult, SavedLink};
