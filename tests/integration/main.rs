//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host (x86_64) with no
//! real hardware required.

// Host critical-section implementation for the embassy-sync channels.
use critical_section as _;

mod api_tests;
mod boot_tests;
mod controller_tests;
mod hardware_tests;
mod mock_hw;
