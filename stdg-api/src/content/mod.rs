//! Article content: affiliate lookup, templates, scoring and the generation pipeline

pub mod affiliate;
pub mod pipeline;
pub mod seo;
pub mod template;
pub mod topics;

pub use affiliate::{AffiliateCatalog, AffiliateEntry};
pub use pipeline::{ContentPipeline, ContentSource, GeneratedContent, GenerationRequest};
