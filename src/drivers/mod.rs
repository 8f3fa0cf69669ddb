//! Peripheral bring-up and the task watchdog.

pub mod hw_init;
pub mod watchdog;
