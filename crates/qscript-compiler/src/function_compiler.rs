//! Per-unit compilation state and the public [`Compiler`] entry point.
//!
//! A [`FunctionCompiler`] owns everything needed to lower one function body
//! (or one program) into a [`CompilationUnit`]: the emitter, the
//! break/continue frames, the unwind stack used by abrupt exits, the try
//! regions feeding the exception table, and the table of nested functions.
//!
//! Statement lowering lives in [`crate::stmt`], expression lowering in
//! [`crate::expr`]; both are `impl FunctionCompiler` blocks.

use qscript_core::{CompilationError, Name, NameTable, Span};
use qscript_parser::ast::{BlockStmt, Function, Program, Stmt};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::bytecode::{
    CompilationUnit, ExceptionTable, FunctionFlags, FunctionId, FunctionTemplate, OpCode,
};
use crate::config::CompilerConfig;
use crate::emit::{Emitter, LoopStack};
use crate::hoist;

pub(crate) type Result<T> = std::result::Result<T, CompilationError>;

/// Whether a unit is a program or a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Ends with `Halt`; expression statements record a completion value;
    /// `return` is rejected.
    Program,
    /// Ends with `LoadUndefined; Ret`.
    Function,
}

/// Something an abrupt exit must undo on its way out.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Unwind<'ast> {
    /// Inside a `with` body: emit `LeaveWith`.
    With,
    /// A for-in enumerator sits on the stack: `Pop` on break/continue.
    Enumerator,
    /// Inside the exceptional copy of a finally body: the saved exception
    /// sits on the stack.
    SavedException,
    /// Inside a catch body: emit `EndCatch`.
    CatchScope,
    /// Inside a try body protected by a catch.
    CatchTry { region: usize },
    /// Inside code protected by a finally: run an inline copy of it.
    FinallyTry {
        region: usize,
        finalizer: &'ast BlockStmt<'ast>,
    },
}

impl Unwind<'_> {
    /// Evaluation stack slots this entry holds.
    pub(crate) fn stack_slots(&self) -> u32 {
        matches!(self, Unwind::Enumerator | Unwind::SavedException) as u32
    }

    /// Dynamic scopes this entry holds.
    pub(crate) fn scope_slots(&self) -> u32 {
        matches!(self, Unwind::With | Unwind::CatchScope) as u32
    }
}

/// Instruction range protected by one try construct, split into segments
/// wherever an inlined finally copy interrupts it.
#[derive(Debug, Default)]
pub(crate) struct Region {
    /// Closed, non-empty `[start, end)` ranges in emission order.
    pub segments: Vec<(usize, usize)>,
    /// Start of the segment being emitted, if any.
    pub open: Option<usize>,
}

/// Lowers one function body or program.
pub struct FunctionCompiler<'c, 'ast> {
    pub(crate) names: &'c mut NameTable,
    pub(crate) config: &'c CompilerConfig,
    pub(crate) kind: UnitKind,
    pub(crate) emitter: Emitter,
    /// Targets for `break` and `continue`.
    pub(crate) loops: LoopStack,
    /// Constructs an abrupt exit must undo, innermost last.
    pub(crate) unwind: Vec<Unwind<'ast>>,
    /// Every try region opened in this unit, indexed by the `Unwind` entries.
    pub(crate) regions: Vec<Region>,
    pub(crate) handlers: ExceptionTable,
    /// Templates for nested function literals, indexed by `FunctionId`.
    pub(crate) functions: Vec<FunctionTemplate>,
    pub(crate) flags: FunctionFlags,
    /// Values a `return` leaves on the stack while its unwinding code runs.
    pub(crate) pending_stack: u32,
    /// Statement and expression nesting, counted across nested functions.
    depth: usize,
}

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    pub(crate) fn new(
        names: &'c mut NameTable,
        config: &'c CompilerConfig,
        kind: UnitKind,
        depth: usize,
    ) -> Self {
        Self {
            names,
            config,
            kind,
            emitter: Emitter::new(),
            loops: LoopStack::new(),
            unwind: Vec::new(),
            regions: Vec::new(),
            handlers: ExceptionTable::new(),
            functions: Vec::new(),
            flags: FunctionFlags::empty(),
            pending_stack: 0,
            depth,
        }
    }

    /// Lower `body` into a unit.
    ///
    /// `self_name` is the name of a named function expression; the body then
    /// opens by binding that name to the function itself.
    pub(crate) fn compile_body(
        mut self,
        body: &'ast [Stmt<'ast>],
        formals: Vec<Name>,
        self_name: Option<Name>,
    ) -> Result<(CompilationUnit, FunctionFlags)> {
        self.emit_prologue(body, &formals, self_name)?;

        for stmt in body {
            self.compile_stmt(stmt)?;
        }

        match self.kind {
            UnitKind::Program => {
                self.emitter.emit(OpCode::Halt);
            }
            UnitKind::Function => {
                self.emitter.emit(OpCode::LoadUndefined);
                self.emitter.emit(OpCode::Ret);
            }
        }

        debug_assert!(self.loops.is_empty());
        debug_assert!(self.unwind.is_empty());

        let (instructions, lines) = self.emitter.finish();
        let unit = CompilationUnit::new(instructions, lines, self.handlers, self.functions, formals);
        Ok((unit, self.flags))
    }

    /// Declarations first, then closures for hoisted function declarations.
    ///
    /// ```text
    /// DeclareLocal v          ; each var/function name not among the formals
    /// Resolve f               ; each function declaration, in source order
    /// NewClosure #n
    /// Assign
    /// Pop
    /// ```
    fn emit_prologue(
        &mut self,
        body: &'ast [Stmt<'ast>],
        formals: &[Name],
        self_name: Option<Name>,
    ) -> Result<()> {
        let decls = hoist::collect(body);
        let mut declared: FxHashSet<Name> = formals.iter().copied().collect();

        for text in &decls.names {
            let name = self.names.intern(text);
            if declared.insert(name) {
                self.emitter.emit_name(OpCode::DeclareLocal, name);
            }
        }

        if let Some(name) = self_name {
            if declared.insert(name) {
                self.emitter.emit_name(OpCode::DeclareLocal, name);
                self.emitter.emit_name(OpCode::Resolve, name);
                self.emitter.emit(OpCode::LoadCallee);
                self.emitter.emit(OpCode::Assign);
                self.emitter.emit(OpCode::Pop);
                self.flags |= FunctionFlags::SELF_BINDING;
            }
        }

        for func in decls.functions {
            let Some(ident) = func.name else { continue };
            self.emitter.set_line(func.span.line);
            let id = self.compile_nested(func, false)?;
            let name = self.names.intern(ident.name);
            self.emitter.emit_name(OpCode::Resolve, name);
            self.emitter.emit_closure(id);
            self.emitter.emit(OpCode::Assign);
            self.emitter.emit(OpCode::Pop);
        }

        Ok(())
    }

    /// Compile a function literal into this unit's function table.
    pub(crate) fn compile_nested(
        &mut self,
        func: &'ast Function<'ast>,
        expression: bool,
    ) -> Result<FunctionId> {
        let name = func.name.map(|ident| self.names.intern(ident.name));
        let formals: Vec<Name> = func.params.iter().map(|p| self.names.intern(p.name)).collect();
        let self_name = if expression { name } else { None };

        trace!(
            name = func.name.map(|n| n.name).unwrap_or("<anonymous>"),
            params = formals.len(),
            "compiling nested function"
        );

        let nested = FunctionCompiler::new(
            &mut *self.names,
            self.config,
            UnitKind::Function,
            self.depth + 1,
        );
        let (unit, mut flags) = nested.compile_body(func.body, formals, self_name)?;
        if expression {
            flags |= FunctionFlags::EXPRESSION;
        }

        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(FunctionTemplate {
            name,
            flags,
            unit,
            span: func.span,
        });
        Ok(id)
    }

    // ==========================================================================
    // Shared helpers
    // ==========================================================================

    pub(crate) fn intern(&mut self, text: &str) -> Name {
        self.names.intern(text)
    }

    pub(crate) fn enter(&mut self, span: Span) -> Result<()> {
        self.depth += 1;
        if self.depth > self.config.max_nesting_depth {
            return Err(CompilationError::NestingTooDeep {
                limit: self.config.max_nesting_depth,
                span,
            });
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Stack and scope depth an exception handler registered now must restore.
    pub(crate) fn handler_depths(&self) -> (u32, u32) {
        let stack = self.unwind.iter().map(Unwind::stack_slots).sum::<u32>() + self.pending_stack;
        let scopes = self.unwind.iter().map(Unwind::scope_slots).sum();
        (stack, scopes)
    }
}

/// Compiles ASTs into [`CompilationUnit`]s.
///
/// Names are interned into the caller's [`NameTable`] so units compiled by
/// the same compiler share operand handles.
///
/// ```
/// use bumpalo::Bump;
/// use qscript_compiler::Compiler;
/// use qscript_compiler::bytecode::OpCode;
/// use qscript_core::NameTable;
/// use qscript_parser::Parser;
///
/// let arena = Bump::new();
/// let program = Parser::parse_program("x = 1;", &arena).unwrap();
///
/// let mut names = NameTable::new();
/// let unit = Compiler::new(&mut names).compile_program(&program);
/// unit.assert_opcodes(&[
///     OpCode::Resolve,
///     OpCode::LoadNumber,
///     OpCode::Assign,
///     OpCode::StoreResult,
///     OpCode::Halt,
/// ]);
/// ```
pub struct Compiler<'n> {
    /// Interner shared by every unit this compiler produces.
    names: &'n mut NameTable,
    config: CompilerConfig,
}

impl<'n> Compiler<'n> {
    pub fn new(names: &'n mut NameTable) -> Self {
        Self::with_config(names, CompilerConfig::default())
    }

    pub fn with_config(names: &'n mut NameTable, config: CompilerConfig) -> Self {
        Self { names, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The table operand names resolve against.
    pub fn names(&self) -> &NameTable {
        self.names
    }

    /// Compile a function body with the given formal parameters.
    ///
    /// Errors do not propagate: the returned unit is marked invalid instead.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile<'ast>(&mut self, body: &'ast [Stmt<'ast>], formals: &[Name]) -> CompilationUnit {
        self.run(UnitKind::Function, body, formals)
    }

    /// Compile a whole program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_program<'ast>(&mut self, program: &Program<'ast>) -> CompilationUnit {
        self.run(UnitKind::Program, program.body, &[])
    }

    fn run<'ast>(&mut self, kind: UnitKind, body: &'ast [Stmt<'ast>], formals: &[Name]) -> CompilationUnit {
        let compiler = FunctionCompiler::new(&mut *self.names, &self.config, kind, 0);
        match compiler.compile_body(body, formals.to_vec(), None) {
            Ok((unit, _)) => {
                debug!(
                    instructions = unit.len(),
                    handlers = unit.handlers().len(),
                    functions = unit.functions().len(),
                    "compiled {kind:?} unit"
                );
                unit
            }
            Err(error) => {
                debug!(%error, "compilation failed");
                CompilationUnit::invalid(error, formals.to_vec())
            }
        }
    }
}
