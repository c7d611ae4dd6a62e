//! Shared test harness modules for the postcode CLI.

use super::*;

mod unit;
