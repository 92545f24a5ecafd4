//! jpa-sampler - SQL previews for Spring Data repositories
//!
//! This crate turns the `@Query` declarations of a repository interface into
//! executable SQL and samples their rows from a live database:
//! - Java source parsing for repositories and JPA entities
//! - Entity metadata resolution (tables, columns, relationship joins)
//! - JPQL parsing and rewriting
//! - Dialect-aware SQL generation and sampling

pub mod config;
pub mod entity_catalog;
pub mod java_source;
pub mod jpql_parser;
pub mod sampler;
pub mod sql_generator;
pub mod translator;
