//! Memory types and selection operations
//!
//! The core of the crate: data model, scalar relevance signals, learned
//! ratings, diversity sampling, the selection pipeline, and the feedback
//! learning loop.

pub mod diversity;
pub mod feedback;
pub mod rating;
pub mod selection;
pub mod signals;
pub mod types;

pub use diversity::{select_by_mmr, weighted_sample};
pub use feedback::LearningPipeline;
pub use rating::{MemoryRating, RatingTable, rating_key, thompson_sample};
pub use selection::{SelectionOptions, SelectionPipeline};
pub use types::{Memory, MemoryInteraction, PromptKernel, SelectedMemory, SignalBreakdown};
