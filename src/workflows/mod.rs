pub mod binding;
pub mod workflow;
