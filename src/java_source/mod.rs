//! Reading Java source files: just enough structure (package, imports, type
//! headers, annotations, fields and method signatures) to resolve entities
//! and repository queries.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod locator;
pub mod parser;

pub use ast::{Annotation, CompilationUnit, TypeDeclaration, TypeRef, TypeScope};
pub use errors::JavaSourceError;
pub use locator::{FileSourceLocator, SourceLocator};
pub use parser::parse_compilation_unit;
