pub mod build;
pub mod config;
pub mod doctor;
pub mod restore;
pub mod serve;
