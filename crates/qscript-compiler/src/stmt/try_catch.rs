//! Try/catch/finally compilation and exception table registration.

use qscript_parser::ast::TryStmt;
use tracing::trace;

use crate::bytecode::{ExceptionHandler, HandlerKind, OpCode};
use crate::function_compiler::{FunctionCompiler, Region, Result, Unwind};

impl<'c, 'ast> FunctionCompiler<'c, 'ast> {
    /// Bytecode layout:
    /// ```text
    /// try:
    /// [try block]
    /// Branch -> after_catch   ; only with a catch
    /// catch:
    /// BeginCatch e
    /// [catch block]
    /// EndCatch
    /// after_catch:
    /// [finally block]         ; normal-completion copy
    /// Branch -> end
    /// finally:
    /// BeginFinally
    /// [finally block]
    /// EndFinally
    /// end:
    /// ```
    ///
    /// The catch descriptor covers the try block and is appended. The finally
    /// descriptor covers try and catch blocks; it is appended after the catch
    /// descriptor when there is one and prepended otherwise.
    pub(crate) fn compile_try(&mut self, stmt: &'ast TryStmt<'ast>) -> Result<()> {
        let (stack_depth, scope_depth) = self.handler_depths();
        let nesting = self.try_nesting();

        let finally_region = stmt.finalizer.as_ref().map(|finalizer| {
            let region = self.open_region();
            self.unwind.push(Unwind::FinallyTry { region, finalizer });
            region
        });
        let catch_region = stmt.handler.as_ref().map(|_| {
            let region = self.open_region();
            self.unwind.push(Unwind::CatchTry { region });
            region
        });

        self.compile_stmts(stmt.block.stmts)?;

        let mut catch_entry = None;
        if let (Some(handler), Some(region)) = (&stmt.handler, catch_region) {
            self.close_region(region);
            self.unwind.pop();
            let skip = self.emitter.emit_branch(OpCode::Branch);

            self.emitter.set_line(handler.span.line);
            catch_entry = Some(self.emitter.next_instruction_offset());
            let param = self.intern(handler.param.name);
            self.emitter.emit_name(OpCode::BeginCatch, param);
            self.unwind.push(Unwind::CatchScope);
            self.compile_stmts(handler.body.stmts)?;
            self.unwind.pop();
            self.emitter.emit(OpCode::EndCatch);

            self.emitter.patch_here(skip);
        }

        let mut finally_entry = None;
        if let (Some(finalizer), Some(region)) = (&stmt.finalizer, finally_region) {
            self.close_region(region);
            self.unwind.pop();

            self.emitter.set_line(finalizer.span.line);
            self.compile_stmts(finalizer.stmts)?;
            let skip = self.emitter.emit_branch(OpCode::Branch);

            finally_entry = Some(self.emitter.next_instruction_offset());
            self.emitter.emit(OpCode::BeginFinally);
            self.unwind.push(Unwind::SavedException);
            self.compile_stmts(finalizer.stmts)?;
            self.unwind.pop();
            self.emitter.emit(OpCode::EndFinally);

            self.emitter.patch_here(skip);
        }

        let descriptor = |kind: HandlerKind, (start, end): (usize, usize), handler: usize| ExceptionHandler {
            kind,
            start,
            end,
            handler,
            stack_depth,
            scope_depth,
            nesting,
        };

        if let (Some(region), Some(entry)) = (catch_region, catch_entry) {
            for &segment in &self.regions[region].segments {
                self.handlers.append(descriptor(HandlerKind::Catch, segment, entry));
            }
        }
        if let (Some(region), Some(entry)) = (finally_region, finally_entry) {
            let handlers: Vec<_> = self.regions[region]
                .segments
                .iter()
                .map(|&segment| descriptor(HandlerKind::Finally, segment, entry))
                .collect();
            if catch_entry.is_some() {
                for handler in handlers {
                    self.handlers.append(handler);
                }
            } else {
                self.handlers.prepend_all(handlers);
            }
        }
        trace!(handlers = self.handlers.len(), stack_depth, scope_depth, nesting, "registered try handlers");

        Ok(())
    }

    /// Enclosing `try` statements whose protected regions are still open.
    fn try_nesting(&self) -> u32 {
        self.unwind
            .iter()
            .filter(|entry| matches!(entry, Unwind::CatchTry { .. } | Unwind::FinallyTry { .. }))
            .count() as u32
    }

    // ==========================================================================
    // Regions
    // ==========================================================================

    fn open_region(&mut self) -> usize {
        self.regions.push(Region {
            segments: Vec::new(),
            open: Some(self.emitter.next_instruction_offset()),
        });
        self.regions.len() - 1
    }

    /// End the current segment; empty segments are dropped.
    pub(crate) fn close_region(&mut self, region: usize) {
        let end = self.emitter.next_instruction_offset();
        let region = &mut self.regions[region];
        if let Some(start) = region.open.take() {
            if end > start {
                region.segments.push((start, end));
            }
        }
    }

    pub(crate) fn reopen_region(&mut self, region: usize) {
        self.regions[region].open = Some(self.emitter.next_instruction_offset());
    }
}

#[cfg(test)]
mod tests {
    use crate::bytecode::{HandlerKind, OpCode};
    use crate::test_support::{branch_targets, compile, compile_body};

    #[test]
    fn try_catch() {
        let (unit, _) = compile("try { f(); } catch (e) { g(); }");
        unit.assert_opcodes(&[
            OpCode::Resolve,
            OpCode::Call,
            OpCode::StoreResult,
            OpCode::Branch,
            OpCode::BeginCatch,
            OpCode::Resolve,
            OpCode::Call,
            OpCode::StoreResult,
            OpCode::EndCatch,
            OpCode::Halt,
        ]);
        assert_eq!(branch_targets(&unit), vec![(3, 9)]);

        let handlers = unit.handlers().as_slice();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].kind, HandlerKind::Catch);
        assert_eq!((handlers[0].start, handlers[0].end, handlers[0].handler), (0, 3, 4));
    }

    #[test]
    fn try_finally() {
        let (unit, _) = compile("try { f(); } finally { g(); }");
        unit.assert_opcodes(&[
            OpCode::Resolve,
            OpCode::Call,
            OpCode::StoreResult,
            // normal path
            OpCode::Resolve,
            OpCode::Call,
            OpCode::StoreResult,
            OpCode::Branch,
            // exceptional path
            OpCode::BeginFinally,
            OpCode::Resolve,
            OpCode::Call,
            OpCode::StoreResult,
            OpCode::EndFinally,
            OpCode::Halt,
        ]);
        let handlers = unit.handlers().as_slice();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].kind, HandlerKind::Finally);
        assert_eq!((handlers[0].start, handlers[0].end, handlers[0].handler), (0, 3, 7));
    }

    #[test]
    fn try_catch_finally_descriptors() {
        let (unit, _) = compile("try { a; } catch (e) { b; } finally { c; }");
        // 0 Fetch a, 1 StoreResult, 2 Branch, 3 BeginCatch, 4 Fetch b, 5 StoreResult,
        // 6 EndCatch, 7 Fetch c, 8 StoreResult, 9 Branch, 10 BeginFinally, ...
        let handlers = unit.handlers().as_slice();
        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers[0].kind, HandlerKind::Catch);
        assert_eq!((handlers[0].start, handlers[0].end, handlers[0].handler), (0, 2, 3));
        assert_eq!(handlers[1].kind, HandlerKind::Finally);
        assert_eq!((handlers[1].start, handlers[1].end, handlers[1].handler), (0, 7, 10));
    }

    #[test]
    fn finally_only_is_prepended() {
        let (unit, _) = compile("try { try { a; } catch (e) {} } finally { b; }");
        let kinds: Vec<_> = unit.handlers().iter().map(|h| h.kind).collect();
        assert_eq!(kinds, vec![HandlerKind::Finally, HandlerKind::Catch]);
    }

    #[test]
    fn inner_finally_wins_over_outer_catch() {
        let (unit, _) = compile("try { try { a; } finally { b; } } catch (e) { c; }");
        let inner_finally = unit
            .handlers()
            .iter()
            .find(|h| h.kind == HandlerKind::Finally)
            .map(|h| h.handler)
            .unwrap();
        // The first instruction of the inner try body.
        assert_eq!(unit.handlers().handler_for(0).map(|h| h.handler), Some(inner_finally));
    }

    #[test]
    fn inner_catch_wins_over_outer_finally() {
        let (unit, _) = compile("try { try { a; } catch (e) { b; } } finally { c; }");
        let inner_catch = unit
            .handlers()
            .iter()
            .find(|h| h.kind == HandlerKind::Catch)
            .map(|h| h.handler)
            .unwrap();
        assert_eq!(unit.handlers().handler_for(0).map(|h| h.handler), Some(inner_catch));
    }

    #[test]
    fn return_keeps_inner_catch_ahead_of_outer_finally() {
        let (unit, _) = compile_body("try { try { a(); return; } catch (e) { h(); } } finally { c(); }", &[]);
        // 0 Resolve a, 1 Call, 2 Pop, 3 LoadUndefined,
        // 4 Resolve c, 5 Call, 6 Pop, 7 Ret,                     ; inline outer finally
        // 8 Branch, 9 BeginCatch, 10 Resolve h, 11 Call, 12 Pop, 13 EndCatch,
        // 14 Resolve c, ..., 18 BeginFinally, ...
        let segments: Vec<_> = unit.handlers().iter().map(|h| (h.kind, h.start, h.end)).collect();
        assert_eq!(
            segments,
            vec![
                (HandlerKind::Finally, 0, 4),
                (HandlerKind::Finally, 8, 14),
                (HandlerKind::Catch, 0, 4),
            ]
        );
        let at = |ip| unit.handlers().handler_for(ip).map(|h| (h.kind, h.handler));
        assert_eq!(at(0), Some((HandlerKind::Catch, 9)));
        assert_eq!(at(3), Some((HandlerKind::Catch, 9)));
        assert_eq!(at(10), Some((HandlerKind::Finally, 18)));
        assert_eq!(at(5), None);
    }

    #[test]
    fn break_keeps_inner_catch_ahead_of_outer_finally() {
        let (unit, _) = compile("while (x) { try { try { a(); break; } catch (e) { h(); } } finally { c(); } }");
        // 0 Fetch x, 1 BranchFalse, 2 Resolve a, 3 Call, 4 StoreResult,
        // 5 Resolve c, 6 Call, 7 StoreResult, 8 Branch(break),   ; inline outer finally
        // 9 Branch, 10 BeginCatch, 11 Resolve h, 12 Call, 13 StoreResult, 14 EndCatch, ...
        let catch = unit.handlers().iter().find(|h| h.kind == HandlerKind::Catch).copied().unwrap();
        assert_eq!((catch.start, catch.end, catch.handler), (2, 5, 10));
        let at = |ip| unit.handlers().handler_for(ip).map(|h| h.kind);
        assert_eq!(at(2), Some(HandlerKind::Catch));
        assert_eq!(at(4), Some(HandlerKind::Catch));
        assert_eq!(at(6), None);
        assert_eq!(at(12), Some(HandlerKind::Finally));
    }

    #[test]
    fn break_keeps_inner_finally_ahead_of_outer_catch() {
        let (unit, _) = compile("while (x) { try { try { a(); break; } finally { f(); } } catch (e) { g(); } }");
        // 0 Fetch x, 1 BranchFalse, 2 Resolve a, 3 Call, 4 StoreResult,
        // 5 Resolve f, 6 Call, 7 StoreResult, 8 Branch(break),   ; inline inner finally
        // 9 Resolve f, 10 Call, 11 StoreResult, 12 Branch,        ; normal path
        // 13 BeginFinally, 14 Resolve f, 15 Call, 16 StoreResult, 17 EndFinally,
        // 18 Branch, 19 BeginCatch, ...
        let at = |ip| unit.handlers().handler_for(ip).map(|h| (h.kind, h.handler));
        assert_eq!(at(2), Some((HandlerKind::Finally, 13)));
        // The inline copy still runs inside the outer try.
        assert_eq!(at(5), Some((HandlerKind::Catch, 19)));
        assert_eq!(at(14), Some((HandlerKind::Catch, 19)));
        assert_eq!(at(8), None);
    }

    #[test]
    fn nested_try_records_its_level() {
        let (unit, _) = compile("try { try { a; } catch (e) { } } finally { } try { b; } catch (e) { }");
        let levels: Vec<_> = unit.handlers().iter().map(|h| (h.kind, h.nesting)).collect();
        assert_eq!(
            levels,
            vec![
                (HandlerKind::Finally, 0),
                (HandlerKind::Catch, 1),
                (HandlerKind::Catch, 0),
            ]
        );
    }

    #[test]
    fn break_through_finally_inlines_a_copy() {
        let (unit, _) = compile("while (x) { try { a; break; } finally { f(); } }");
        // 0 Fetch x, 1 BranchFalse, 2 Fetch a, 3 StoreResult
        // 4 Resolve f, 5 Call, 6 StoreResult, 7 Branch(break)      ; inline copy
        // 8 Resolve f, 9 Call, 10 StoreResult, 11 Branch            ; normal path
        // 12 BeginFinally, 13 Resolve f, 14 Call, 15 StoreResult, 16 EndFinally
        // 17 Branch(top), 18 Halt
        assert_eq!(unit.count_opcode(OpCode::Call), 3);
        assert_eq!(branch_targets(&unit), vec![(1, 18), (7, 18), (11, 17), (17, 0)]);

        let handlers = unit.handlers().as_slice();
        assert_eq!(handlers.len(), 1);
        assert_eq!((handlers[0].start, handlers[0].end, handlers[0].handler), (2, 4, 12));
        assert!((4..8).all(|ip| !handlers[0].covers(ip)));
    }

    #[test]
    fn return_through_finally_splits_the_region() {
        let (unit, _) = compile_body("try { a(); if (c) return 1; d(); } finally { b(); }", &[]);
        // 0 Resolve a, 1 Call, 2 Pop, 3 Fetch c, 4 BranchFalse, 5 LoadNumber,
        // 6 Resolve b, 7 Call, 8 Pop, 9 Ret,
        // 10 Resolve d, 11 Call, 12 Pop,
        // 13 Resolve b, 14 Call, 15 Pop, 16 Branch, 17 BeginFinally, ...
        let segments: Vec<_> = unit.handlers().iter().map(|h| (h.start, h.end)).collect();
        assert_eq!(segments, vec![(0, 6), (10, 13)]);
        assert!(unit.handlers().iter().all(|h| h.handler == 17));
        assert!(unit.handlers().iter().all(|h| h.kind == HandlerKind::Finally));
    }

    #[test]
    fn jump_as_only_statement_leaves_nothing_protected() {
        let (unit, _) = compile("while (x) { try { break; } finally { f(); } }");
        assert!(unit.handlers().is_empty());
        assert_eq!(unit.count_opcode(OpCode::BeginFinally), 1);
    }

    #[test]
    fn nested_finally_copies_run_innermost_first() {
        let (unit, _) = compile_body(
            "try { try { return; } finally { inner(); } } finally { outer(); }",
            &[],
        );
        let calls: Vec<_> = unit
            .instructions()
            .iter()
            .filter(|inst| inst.op == OpCode::Resolve || inst.op == OpCode::Ret)
            .map(|inst| inst.op)
            .collect();
        // inline inner, inline outer, Ret, ...
        assert_eq!(&calls[..3], &[OpCode::Resolve, OpCode::Resolve, OpCode::Ret]);
    }

    #[test]
    fn handlers_inside_with_record_scope_depth() {
        let (unit, _) = compile("with (o) { try { a; } catch (e) { } }");
        let handler = unit.handlers().as_slice()[0];
        assert_eq!(handler.scope_depth, 1);
        assert_eq!(handler.stack_depth, 0);
    }

    #[test]
    fn handlers_inside_for_in_record_stack_depth() {
        let (unit, _) = compile("for (k in o) { try { a; } catch (e) { } }");
        let handler = unit.handlers().as_slice()[0];
        assert_eq!(handler.stack_depth, 1);
    }

    #[test]
    fn break_from_exceptional_finally_pops_saved_exception() {
        let (unit, _) = compile("while (x) { try { } finally { break; } }");
        // Normal copy: Branch(break). Exceptional copy: BeginFinally, Pop, Branch(break), EndFinally.
        unit.assert_contains_opcodes(&[OpCode::BeginFinally, OpCode::Pop, OpCode::Branch, OpCode::EndFinally]);
        assert!(unit.handlers().is_empty());
    }
}
