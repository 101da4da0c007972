//! Finds the interactive elements of a webpage and turns a generative model's
//! reply into a ranked list of analytics tagging recommendations.

pub mod brain;
pub mod config;
pub mod dom;
pub mod error;
pub mod face;
pub mod hands;
pub mod pipeline;
pub mod recovery;
pub mod types;

pub use config::Config;
pub use dom::{extract_elements, extract_from_markup, synthesize_selector};
pub use error::{AnalyzeError, BrainError, ExtractError, FetchError};
pub use recovery::recover_recommendations;
pub use types::{Analysis, ElementKind, InteractiveElement, Recommendation};
