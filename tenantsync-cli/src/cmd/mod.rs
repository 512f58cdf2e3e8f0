pub mod config;
pub mod doctor;
pub mod jobs;
pub mod run;
pub mod tenants;
