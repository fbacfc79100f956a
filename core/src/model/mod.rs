pub mod reading;
pub mod summary;
