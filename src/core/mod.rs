//! Analysis pipeline.
//!
//! 1. `parsers`: source text to the closed syntax model in `syntax`
//! 2. `comments`: same-line comment reattachment
//! 3. `modules`: index of every relatively required file
//! 4. `resolve`: static evaluation of expressions to values
//! 5. `render`: Markdown for fields, schemas and the whole document

pub mod comments;
pub mod diagnostics;
pub mod modules;
pub mod parsers;
pub mod render;
pub mod resolve;
pub mod syntax;
