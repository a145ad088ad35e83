// src/classify/mod.rs

//! URL grouping and calendar-date inference.

pub mod classifier;
pub mod date;
pub mod date_string;
pub mod equivalence;
pub mod group;

pub use classifier::{ClassifySummary, UrlClassifier};
pub use date::{classify, DatePart};
pub use date_string::DateString;
pub use equivalence::Equivalence;
pub use group::{GroupMember, UrlGroup};
