pub mod equation;
pub mod exporter;
pub mod normalizer;
pub mod preprocessor;
pub mod prompt_builder;

pub use exporter::{Dataset, DatasetHead, Exporter};
pub use preprocessor::Preprocessor;
pub use prompt_builder::PromptBuilder;
