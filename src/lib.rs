//! Surf forecast alerting.
//!
//! Decides which forecast days at which spots are worth an alert, holds
//! delivery during quiet hours, and remembers what has already been
//! reported so nothing is reported twice.

pub mod alert;
pub mod config;
pub mod cycle;
pub mod dev_mode;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod rating;
pub mod report;
