pub mod cli;
pub mod collectors;
pub mod scan;
pub mod snapshot;
