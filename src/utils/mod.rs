pub mod error;
pub mod merge;
pub mod pairs;
pub mod properties;
