pub mod fitting;
pub mod samples;
