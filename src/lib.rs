//! mongoose-docgen - Markdown documentation for Mongoose schemas
//!
//! Reads a JavaScript (or TypeScript) source file declaring Mongoose schemas and
//! renders their fields, options, descriptive comments, virtuals, methods, statics
//! and indexes as a Markdown document. Nothing in the input is executed: values
//! such as option spreads and helper results are resolved statically.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Parsing, module indexing, value resolution and rendering
//! - `error`: Library error type
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
