pub mod games;
pub mod profile;
