//! Statement lowering.
//!
//! A single recursive walk over the statement tree that appends to one
//! [`InstructionBuilder`]. Declarations are laid out inline behind a guard
//! jump, so straight-line execution never falls into a body; bodies run only
//! through explicit calls.

pub mod builtins;
pub mod callconv;
pub mod error;
pub mod scope;

use log::debug;
use parser::{Call, Decl, Stmt};
use pseudo::{Command, InstructionBuilder, Program};

use builtins::BuiltinContext;
use error::CompileError;
use scope::{Scope, ScopeChain};

/// Lower a whole program against a freshly seeded global scope.
pub fn lower(stmts: &[Stmt]) -> Result<Program, CompileError> {
    let mut lowerer = Lowerer::new();
    lowerer.lower_all(stmts)?;
    let program = lowerer.finish();
    debug!("lowered {} instructions\n{program}", program.len());
    Ok(program)
}

#[derive(Debug, Default)]
pub struct Lowerer {
    builder: InstructionBuilder,
    scopes: ScopeChain,
}

impl Lowerer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scopes(&self) -> &ScopeChain {
        &self.scopes
    }

    pub fn finish(self) -> Program {
        self.builder.finish()
    }

    pub fn lower_all(&mut self, stmts: &[Stmt]) -> Result<(), CompileError> {
        stmts.iter().try_for_each(|stmt| self.lower_stmt(stmt))
    }

    /// Lower one statement, attributing any failure to it.
    pub fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        let result = match stmt {
            Stmt::Call(call) => self.lower_call(call),
            Stmt::Decl(decl) => self.lower_decl(decl),
        };
        result.map_err(|err| CompileError::In {
            stmt: stmt.to_string(),
            line: stmt.line(),
            inner: Box::new(err),
        })
    }

    /// Run `f` inside `scope`. The scope is popped however `f` returns.
    fn with_scope<T>(
        &mut self,
        scope: Scope,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }

    fn lower_call(&mut self, call: &Call) -> Result<(), CompileError> {
        let name = &call.command.name;

        if let Some(command) = self.scopes.command(name).cloned() {
            let args = self.scopes.typecheck(&call.args, Some(&command.params))?;
            let seqs = callconv::sequences(&args)?;

            let start = self.builder.here();
            if callconv::emit_prolog(&mut self.builder, &seqs) > 0 {
                self.builder.comment(start, format!("prolog {name}"));
            }
            let at = self.builder.call(command.entry);
            self.builder.comment(at, format!("call {name}"));
            let start = self.builder.here();
            if callconv::emit_epilog(&mut self.builder, &seqs) > 0 {
                self.builder.comment(start, format!("epilog {name}"));
            }
            return Ok(());
        }

        let Some(builtin) = builtins::find(name) else {
            return Err(CompileError::Undefined {
                name: name.clone(),
                line: call.command.line,
            });
        };
        let args = self.scopes.typecheck(&call.args, None)?;
        let start = self.builder.here();
        let entry = self.scopes.entry();
        builtin.lower(
            &mut BuiltinContext {
                builder: &mut self.builder,
                entry,
            },
            &args,
        )?;
        self.builder.comment(start, builtin.name);
        Ok(())
    }

    fn lower_decl(&mut self, decl: &Decl) -> Result<(), CompileError> {
        let name = &decl.command.name;
        let entry = self.builder.here() + 1;

        let mut body_scope = Scope::for_declaration(name.clone(), entry);
        let params = scope::bind_params(&mut body_scope, &decl.params)?;
        let command = Command { entry, params };
        debug!("declare `{name}` at {entry}: {command}");

        let guard = self.builder.jump_forward();
        let at = self.builder.label_address(&guard);
        self.builder.comment(at, format!("skip {name}"));
        self.builder.comment(entry, format!("{name}:"));

        self.scopes.define(name, command.clone());
        body_scope.bind_command(name.clone(), command);

        self.with_scope(body_scope, |this| this.lower_all(&decl.body))?;

        self.builder.bind(guard);
        Ok(())
    }
}
