pub mod action;
pub mod config;
pub mod install;
pub mod logging;
pub mod system;
pub mod version;
