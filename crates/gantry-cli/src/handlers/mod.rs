pub mod chart;
pub mod extract;
pub mod fusion;
pub mod summary;
