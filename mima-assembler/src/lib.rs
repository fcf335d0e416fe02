//! MiMa Assembler
//!
//! Assemble MiMa assembly language into a validated [`Program`].
//!
//! ## Example
//!
//! ```rust
//! use mima_assembler::assemble;
//!
//! let source = r#"
//!     LDC 5
//!     JMN negative
//!     LDC 9
//!     negative: HALT
//! "#;
//!
//! let program = assemble(source).unwrap();
//! assert_eq!(program.len(), 4);
//! ```
//!
//! [`Program`]: mima_spec::Program

pub mod assembler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;

pub use assembler::{assemble, Assembler};
pub use error::{AssemblerError, Result};
pub use parser::{parse, Form, Position, RawOperand};
pub use resolver::{resolve, AssemblerOptions};
