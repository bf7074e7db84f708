pub mod repo;
pub mod scan;
