//! Labelled statements.
//!
//! A run of labels (`a: b: stmt`) is attached as a set to the statement it
//! prefixes. Loops and switches carry the set on their own frame; any other
//! statement gets a `Labelled` frame that only `break label` can target.

use qscript_core::{CompilationError, Name};
use qscript_parser::ast::{LabelledStmt, Stmt};

use crate::emit::FrameKind;
use crate::function_compiler::{FunctionCompiler, Result};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    pub(crate) fn compile_labelled(&mut self, stmt: &'ast LabelledStmt<'ast>) -> Result<()> {
        let mut labels: Vec<Name> = Vec::new();
        let mut current = stmt;
        let body = loop {
            let label = self.intern(current.label.name);
            if labels.contains(&label) || self.loops.has_label(label) {
                return Err(CompilationError::DuplicateLabel {
                    label: current.label.name.to_string(),
                    span: current.label.span,
                });
            }
            labels.push(label);
            match &current.body {
                Stmt::Labelled(inner) => current = *inner,
                body => break body,
            }
        };

        match body {
            Stmt::While(s) => self.compile_while(s, &labels),
            Stmt::DoWhile(s) => self.compile_do_while(s, &labels),
            Stmt::For(s) => self.compile_for(s, &labels),
            Stmt::ForIn(s) => self.compile_for_in(s, &labels),
            Stmt::Switch(s) => self.compile_switch(s, &labels),
            other => {
                self.push_frame(FrameKind::Labelled, &labels, None);
                self.compile_stmt(other)?;
                self.pop_frame();
                Ok(())
            }
        }
    }
}
