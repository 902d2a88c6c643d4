//! Call-convention lowering.
//!
//! A call to a declared command must put argument `i` in register `i`
//! right before `CALL_I`, and put the caller's registers back right after
//! it. The arguments describe a parallel move: destination `d` receives
//! either a literal or the old contents of some register `s`. Reading the
//! move as a graph with an edge `s -> d` for every register argument, each
//! register has at most one incoming edge (its own argument position) and,
//! because a register may feed only one parameter, at most one outgoing
//! edge. The graph therefore falls apart into simple chains and cycles,
//! which [`sequences`] finds and [`emit_prolog`]/[`emit_epilog`] turn into
//! moves plus one stack slot per sequence.
//!
//! After the call every source register receives the current value of the
//! parameter register it fed, and every other clobbered register gets its
//! saved value back. Register 0 carries the callee's result and is never
//! written by an epilog.

use std::fmt;

use log::trace;
use pseudo::{InstructionBuilder, MAX_REGISTERS, RETURN_REGISTER, Reg, Value};

use super::error::CompileError;

/// What a dependency sequence starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Number(i64),
    Register(Reg),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "#{n}"),
            Self::Register(reg) => write!(f, "{reg}"),
        }
    }
}

/// A maximal chain `origin -> regs[0] -> regs[1] -> ...` where each step
/// means "the next register receives the previous one's value".
///
/// A sequence is cyclic when its last register is its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub origin: Origin,
    /// Never empty.
    pub regs: Vec<Reg>,
}

impl Sequence {
    pub fn is_cyclic(&self) -> bool {
        matches!(self.origin, Origin::Register(head) if self.regs.last() == Some(&head))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        for reg in &self.regs {
            write!(f, " -> {reg}")?;
        }
        Ok(())
    }
}

/// Follow `feeds` from `first` while the reached register is still a
/// pending source.
fn walk(
    first: Reg,
    feeds: &[Option<Reg>; MAX_REGISTERS],
    pending: &mut [bool; MAX_REGISTERS],
) -> Vec<Reg> {
    let mut regs = vec![first];
    let mut at = first;
    while pending[at.index()] {
        pending[at.index()] = false;
        let Some(next) = feeds[at.index()] else {
            break;
        };
        regs.push(next);
        at = next;
    }
    regs
}

/// Split the argument list of a call into dependency sequences.
///
/// Literal-rooted sequences come first, in destination order. Register
/// sequences follow, each headed by the highest-indexed pending register
/// that no pending register feeds; once only cycles are left, the highest
/// pending register heads the next one. Arguments already in place
/// produce nothing.
pub fn sequences(args: &[Value]) -> Result<Vec<Sequence>, CompileError> {
    let mut feeds = [None; MAX_REGISTERS];
    let mut fed_by = [None; MAX_REGISTERS];
    let mut passed = [false; MAX_REGISTERS];
    let mut literals = Vec::new();

    for (i, arg) in args.iter().enumerate() {
        let dst = Reg::new(i).ok_or_else(|| {
            CompileError::unsupported(format!(
                "more than {MAX_REGISTERS} arguments"
            ))
        })?;
        match *arg {
            Value::Number(n) => literals.push((n, dst)),
            Value::Register(src) => {
                if std::mem::replace(&mut passed[src.index()], true) {
                    return Err(CompileError::unsupported(format!(
                        "register {src} passed to more than one parameter"
                    )));
                }
                if src != dst {
                    feeds[src.index()] = Some(dst);
                    fed_by[dst.index()] = Some(src);
                }
            }
            Value::Command(_) => {
                return Err(CompileError::unsupported(
                    "command passed as an argument",
                ));
            }
        }
    }

    let mut pending = feeds.map(|dst| dst.is_some());
    let mut seqs = Vec::new();

    for (n, dst) in literals {
        let regs = walk(dst, &feeds, &mut pending);
        seqs.push(Sequence {
            origin: Origin::Number(n),
            regs,
        });
    }

    loop {
        let is_pending = |reg: &Reg| pending[reg.index()];
        let fed_by_pending =
            |reg: &Reg| fed_by[reg.index()].is_some_and(|src| pending[src.index()]);
        let head = Reg::all()
            .rev()
            .find(|reg| is_pending(reg) && !fed_by_pending(reg))
            .or_else(|| Reg::all().rev().find(is_pending));
        let Some(head) = head else {
            break;
        };
        pending[head.index()] = false;
        let Some(first) = feeds[head.index()] else {
            continue;
        };
        let regs = walk(first, &feeds, &mut pending);
        seqs.push(Sequence {
            origin: Origin::Register(head),
            regs,
        });
    }

    for seq in &seqs {
        trace!(
            "dependency sequence {seq}{}",
            if seq.is_cyclic() { " (cycle)" } else { "" }
        );
    }
    Ok(seqs)
}

/// Emit the moves that place every argument. Returns the number of
/// instructions emitted.
///
/// For `h -> r1 -> ... -> rk` the tail `rk` is saved on the stack, values
/// are shifted back to front, and `r1` finally receives `h`. A cycle saves
/// its head instead and closes with a pop into `r1`.
pub fn emit_prolog(b: &mut InstructionBuilder, seqs: &[Sequence]) -> usize {
    let start = b.here();
    for seq in seqs {
        let regs = &seq.regs;
        let Some(&tail) = regs.last() else {
            continue;
        };
        let cyclic = seq.is_cyclic();

        // The return register is clobbered by the call anyway.
        if cyclic || tail != RETURN_REGISTER {
            b.push(tail);
        }
        for i in (1..regs.len()).rev() {
            b.move_r(regs[i - 1], regs[i]);
        }
        match seq.origin {
            Origin::Number(n) => b.move_i(n, regs[0]),
            Origin::Register(_) if cyclic => b.pop(regs[0]),
            Origin::Register(head) => b.move_r(head, regs[0]),
        };
    }
    b.here() - start
}

/// Emit the moves that undo [`emit_prolog`] after the call returns.
/// Returns the number of instructions emitted.
///
/// Sequences are handled in reverse so the stack slots come back in LIFO
/// order. Writes into the return register are skipped.
pub fn emit_epilog(b: &mut InstructionBuilder, seqs: &[Sequence]) -> usize {
    fn copy_back(b: &mut InstructionBuilder, src: Reg, dst: Reg) {
        if dst != RETURN_REGISTER {
            b.move_r(src, dst);
        }
    }

    let start = b.here();
    for seq in seqs.iter().rev() {
        let regs = &seq.regs;
        let Some(&tail) = regs.last() else {
            continue;
        };

        if seq.is_cyclic() {
            b.push(regs[0]);
        } else if let Origin::Register(head) = seq.origin {
            copy_back(b, regs[0], head);
        }
        for pair in regs.windows(2) {
            copy_back(b, pair[1], pair[0]);
        }
        if tail != RETURN_REGISTER {
            b.pop(tail);
        }
    }
    b.here() - start
}
