pub mod alerter;
pub mod cli;
pub mod config;
pub mod milestones;
pub mod service;
pub mod sources;
