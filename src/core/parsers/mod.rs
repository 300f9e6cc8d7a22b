//! Source parsing.
//!
//! - `js`: swc front end for `.js`/`.mjs`/`.cjs`/`.jsx` and `.ts` files
//! - `lower`: conversion of the swc AST into [`crate::core::syntax`], including comment
//!   association by position
//! - `requires`: collection of `require(...)` and `import` specifiers

pub mod js;
pub mod lower;
pub mod requires;

pub use js::{ParsedSource, parse_source};
