pub mod etl;

pub use crate::domain::model::{ExtractResult, Record, RunSummary, Sheet, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
