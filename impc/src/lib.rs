//! # impc
//!
//! Code generator for `imp`, a tiny command language, targeting the
//! [`pseudo`] register machine.
//!
//! ```text
//!  source ──parser──▶ Vec<Stmt> ──compiler──▶ Program ──machine──▶ r0
//!                                  │
//!                                  ├─ scope      alias resolution
//!                                  ├─ callconv   argument shuffling
//!                                  └─ builtins   move, add, ...
//! ```
//!
//! ```
//! use impc::{Machine, MachineConfig};
//!
//! let stmts = parser::parse("move #4, @0\nadd @0, @0\n").unwrap();
//! let program = impc::lower(&stmts).unwrap();
//! let result = Machine::new(&program, MachineConfig::default()).run();
//! assert_eq!(result, Ok(8));
//! ```

pub mod compiler;
pub mod machine;

pub use compiler::error::{CompileError, Count, ErrorKind};
pub use compiler::{Lowerer, builtins, callconv, lower, scope};
pub use machine::{Machine, MachineConfig, RuntimeError};
