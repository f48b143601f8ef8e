pub mod scoring;
pub mod submission;
