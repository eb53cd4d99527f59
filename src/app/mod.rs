pub mod pipelines;
pub mod report;

pub use pipelines::royalty_pipeline::RoyaltyPipeline;
pub use pipelines::term_pipeline::TermPipeline;
