//! Unit tests - pure parsing and naming behavior, no filesystem or database

mod case_conversion_tests;
mod parser_robustness_tests;
