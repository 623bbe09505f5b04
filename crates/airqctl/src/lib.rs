//! airqctl - terminal front end for the Sheffield air-quality client.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod render;
pub mod spinner;
