// Routedoc - HTTP route registration with a derived OpenAPI document
//
// The core crate holds the document model, schema reflection and the router
// facade. Concrete router backends are enabled through features.

// Re-export core functionality
pub use routedoc_core::*;

// Re-export optional backends
#[cfg(feature = "colon")]
pub use routedoc_colon as colon;

#[cfg(feature = "matchit")]
pub use routedoc_matchit as matchit;
