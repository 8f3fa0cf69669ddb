//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the transmission
//! controller against mock adapters.  All tests run on the host (x86_64)
//! with no real hardware required.

mod controller_tests;
mod mock_hw;
mod scenario_tests;
