//! Source-to-bytecode front end.

use bumpalo::Bump;
use qscript_compiler::{CompilationUnit, Compiler, CompilerConfig};
use qscript_core::{Name, NameTable, QScriptError};
use qscript_parser::{Parser, ParserConfig};
use tracing::debug;

/// Parses and compiles source text.
///
/// The engine owns the [`NameTable`] every unit it produces refers to, so
/// names in units from different calls can be compared directly. Each call
/// parses into its own arena; units do not borrow from the source.
#[derive(Debug, Default)]
pub struct Engine {
    names: NameTable,
    parser_config: ParserConfig,
    compiler_config: CompilerConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(parser_config: ParserConfig, compiler_config: CompilerConfig) -> Self {
        Self {
            names: NameTable::new(),
            parser_config,
            compiler_config,
        }
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser_config
    }

    pub fn compiler_config(&self) -> &CompilerConfig {
        &self.compiler_config
    }

    /// Compile a program.
    ///
    /// # Errors
    ///
    /// Every parse error, or the first compilation error.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&mut self, source: &str) -> Result<CompilationUnit, QScriptError> {
        let arena = Bump::new();
        let program = Parser::with_config(source, &arena, self.parser_config).program()?;

        let unit = Compiler::with_config(&mut self.names, self.compiler_config).compile_program(&program);
        debug!(
            bytes = source.len(),
            instructions = unit.len(),
            valid = unit.is_valid(),
            "compiled program"
        );
        unit.into_result().map_err(QScriptError::from)
    }

    /// Compile a standalone function from its parameter names and body text,
    /// the way a `Function("a", "b", "return a + b")` constructor would.
    ///
    /// # Errors
    ///
    /// As [`compile`](Self::compile).
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile_function(&mut self, formals: &[&str], body: &str) -> Result<CompilationUnit, QScriptError> {
        let arena = Bump::new();
        let program = Parser::with_config(body, &arena, self.parser_config).program()?;

        let formals: Vec<Name> = formals.iter().map(|text| self.names.intern(text)).collect();
        let unit = Compiler::with_config(&mut self.names, self.compiler_config).compile(program.body, &formals);
        debug!(
            formals = formals.len(),
            instructions = unit.len(),
            valid = unit.is_valid(),
            "compiled function"
        );
        unit.into_result().map_err(QScriptError::from)
    }

    /// Render a unit produced by this engine.
    pub fn disassemble(&self, unit: &CompilationUnit) -> String {
        unit.disassemble(&self.names)
    }
}
