// Metabolic Monitor Dashboard
//
// Terminal composition of the dashboard: the event loop, the effect runner,
// rendering, logging, and command-line configuration.

pub mod app;
pub mod config;
pub mod logging;
pub mod runtime;
pub mod ui;
