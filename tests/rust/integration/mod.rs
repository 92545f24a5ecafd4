//! Integration tests - Java source trees on disk, translation end to end and
//! repository processing against a recording executor.

mod common;
mod repository_processing_tests;
mod translation_tests;
