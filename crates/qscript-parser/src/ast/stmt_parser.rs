//! Statement parsing.

use bumpalo::collections::Vec as BVec;
use qscript_core::{ParseError, ParseErrorKind};

use crate::ast::expr::{Expr, Ident};
use crate::ast::parser::Parser;
use crate::ast::stmt::*;
use crate::lexer::TokenKind;

type Result<T> = std::result::Result<T, ParseError>;

impl<'ast> Parser<'ast> {
    pub fn parse_statement(&mut self) -> Result<Stmt<'ast>> {
        let token = self.peek();
        self.enter(token.span)?;
        let result = self.parse_statement_inner();
        self.leave();
        result
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt<'ast>> {
        let token = self.peek();
        match token.kind {
            TokenKind::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Var => {
                let var = self.parse_var(true)?;
                self.consume_semicolon()?;
                Ok(Stmt::Var(var))
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty(token.span))
            }
            TokenKind::Function => Ok(Stmt::Function(self.parse_function(true)?)),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Continue => Ok(Stmt::Continue(self.parse_jump()?)),
            TokenKind::Break => Ok(Stmt::Break(self.parse_jump()?)),
            TokenKind::Return => self.parse_return(),
            TokenKind::With => self.parse_with(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Identifier if self.peek_nth(1).kind == TokenKind::Colon => {
                self.parse_labelled()
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            _ => self.parse_expr_stmt(),
        }
    }

    pub(super) fn parse_block(&mut self) -> Result<BlockStmt<'ast>> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut stmts = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            if self.is_eof() {
                return Err(ParseError::unexpected_eof(self.peek().span));
            }
            stmts.push(self.parse_statement()?);
        }
        self.advance();
        Ok(BlockStmt {
            stmts: stmts.into_bump_slice(),
            span: self.span_from(open.span),
        })
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt<'ast>> {
        let expr = self.parse_expr(true)?;
        self.consume_semicolon()?;
        Ok(Stmt::Expr(ExprStmt {
            expr,
            span: self.span_from(expr.span()),
        }))
    }

    /// `var a = 1, b`. Without `allow_in`, initializers stop before `in`.
    fn parse_var(&mut self, allow_in: bool) -> Result<VarStmt<'ast>> {
        let keyword = self.expect(TokenKind::Var)?;
        let mut declarators = BVec::new_in(self.arena);
        loop {
            let name = self.expect_identifier()?;
            let init = if self.eat(TokenKind::Equal).is_some() {
                Some(self.parse_assignment(allow_in)?)
            } else {
                None
            };
            declarators.push(VarDeclarator {
                name: Ident::new(name.lexeme, name.span),
                init,
                span: self.span_from(name.span),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        Ok(VarStmt {
            declarators: declarators.into_bump_slice(),
            span: self.span_from(keyword.span),
        })
    }

    fn parse_paren_expr(&mut self) -> Result<Expr<'ast>> {
        self.expect(TokenKind::LeftParen)?;
        let expr = self.parse_expr(true)?;
        self.expect(TokenKind::RightParen)?;
        Ok(expr)
    }

    fn parse_if(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let condition = self.parse_paren_expr()?;
        let then_stmt = self.parse_statement()?;
        let else_stmt = if self.eat(TokenKind::Else).is_some() {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_stmt,
            else_stmt,
            span: self.span_from(keyword.span),
        })))
    }

    fn parse_while(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let condition = self.parse_paren_expr()?;
        let body = self.parse_statement()?;
        Ok(Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: self.span_from(keyword.span),
        })))
    }

    fn parse_do_while(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let body = self.parse_statement()?;
        self.expect(TokenKind::While)?;
        let condition = self.parse_paren_expr()?;
        // The semicolon after `do ... while (c)` is always optional.
        self.eat(TokenKind::Semicolon);
        Ok(Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            condition,
            span: self.span_from(keyword.span),
        })))
    }

    fn parse_for(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let each = if self.check_contextual("each") {
            self.advance();
            true
        } else {
            false
        };
        self.expect(TokenKind::LeftParen)?;

        let mut init = None;
        if !self.check(TokenKind::Semicolon) {
            if self.check(TokenKind::Var) {
                let var = self.parse_var(false)?;
                if var.declarators.len() == 1 && self.eat(TokenKind::In).is_some() {
                    return self.finish_for_in(keyword.span, each, ForInTarget::Var(var.declarators[0]));
                }
                init = Some(ForInit::Var(var));
            } else {
                let expr = self.parse_expr(false)?;
                if self.check(TokenKind::In) {
                    let in_token = self.advance();
                    if !expr.is_reference() {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidAssignmentTarget,
                            expr.span(),
                            format!("invalid for-in target before {}", in_token.kind),
                        ));
                    }
                    return self.finish_for_in(keyword.span, each, ForInTarget::Expr(expr));
                }
                init = Some(ForInit::Expr(expr));
            }
        }

        if each {
            let found = self.peek();
            return Err(ParseError::expected_token(found.span, "'in'", found.kind.as_str()));
        }

        self.expect(TokenKind::Semicolon)?;
        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(true)?)
        };
        self.expect(TokenKind::Semicolon)?;
        let update = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr(true)?)
        };
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_statement()?;

        Ok(Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            update,
            body,
            span: self.span_from(keyword.span),
        })))
    }

    fn finish_for_in(
        &mut self,
        start: qscript_core::Span,
        each: bool,
        target: ForInTarget<'ast>,
    ) -> Result<Stmt<'ast>> {
        let object = self.parse_expr(true)?;
        self.expect(TokenKind::RightParen)?;
        let body = self.parse_statement()?;
        Ok(Stmt::ForIn(self.arena.alloc(ForInStmt {
            each,
            target,
            object,
            body,
            span: self.span_from(start),
        })))
    }

    /// `break` / `continue`; a label must be on the same line.
    fn parse_jump(&mut self) -> Result<JumpStmt<'ast>> {
        let keyword = self.advance();
        let next = self.peek();
        let label = if next.kind == TokenKind::Identifier && !next.newline_before {
            self.advance();
            Some(Ident::new(next.lexeme, next.span))
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(JumpStmt {
            label,
            span: self.span_from(keyword.span),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let next = self.peek();
        let value = if next.newline_before
            || matches!(
                next.kind,
                TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
            ) {
            None
        } else {
            Some(self.parse_expr(true)?)
        };
        self.consume_semicolon()?;
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: self.span_from(keyword.span),
        }))
    }

    fn parse_throw(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let next = self.peek();
        if next.newline_before {
            return Err(ParseError::expected_expression(next.span, "line break"));
        }
        let value = self.parse_expr(true)?;
        self.consume_semicolon()?;
        Ok(Stmt::Throw(ThrowStmt {
            value,
            span: self.span_from(keyword.span),
        }))
    }

    fn parse_with(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let object = self.parse_paren_expr()?;
        let body = self.parse_statement()?;
        Ok(Stmt::With(self.arena.alloc(WithStmt {
            object,
            body,
            span: self.span_from(keyword.span),
        })))
    }

    fn parse_switch(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let discriminant = self.parse_paren_expr()?;
        self.expect(TokenKind::LeftBrace)?;

        let mut clauses = BVec::new_in(self.arena);
        let mut seen_default = false;
        while self.eat(TokenKind::RightBrace).is_none() {
            let head = self.peek();
            let test = match head.kind {
                TokenKind::Case => {
                    self.advance();
                    Some(self.parse_expr(true)?)
                }
                TokenKind::Default => {
                    self.advance();
                    if seen_default {
                        return Err(ParseError::new(
                            ParseErrorKind::DuplicateDefault,
                            head.span,
                            "more than one default clause in switch",
                        ));
                    }
                    seen_default = true;
                    None
                }
                TokenKind::Eof => return Err(ParseError::unexpected_eof(head.span)),
                other => {
                    return Err(ParseError::expected_token(
                        head.span,
                        "'case', 'default' or '}'",
                        other.as_str(),
                    ));
                }
            };
            self.expect(TokenKind::Colon)?;

            let mut body = BVec::new_in(self.arena);
            while !matches!(
                self.peek().kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                body.push(self.parse_statement()?);
            }
            clauses.push(SwitchClause {
                test,
                body: body.into_bump_slice(),
                span: self.span_from(head.span),
            });
        }

        Ok(Stmt::Switch(self.arena.alloc(SwitchStmt {
            discriminant,
            clauses: clauses.into_bump_slice(),
            span: self.span_from(keyword.span),
        })))
    }

    fn parse_labelled(&mut self) -> Result<Stmt<'ast>> {
        let name = self.advance();
        self.expect(TokenKind::Colon)?;
        let body = self.parse_statement()?;
        Ok(Stmt::Labelled(self.arena.alloc(LabelledStmt {
            label: Ident::new(name.lexeme, name.span),
            body,
            span: self.span_from(name.span),
        })))
    }

    fn parse_try(&mut self) -> Result<Stmt<'ast>> {
        let keyword = self.advance();
        let block = self.parse_block()?;

        let handler = if let Some(catch) = self.eat(TokenKind::Catch) {
            self.expect(TokenKind::LeftParen)?;
            let param = self.expect_identifier()?;
            self.expect(TokenKind::RightParen)?;
            let body = self.parse_block()?;
            Some(CatchClause {
                param: Ident::new(param.lexeme, param.span),
                body,
                span: self.span_from(catch.span),
            })
        } else {
            None
        };

        let finalizer = if self.eat(TokenKind::Finally).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError::new(
                ParseErrorKind::MissingCatchOrFinally,
                self.peek().span,
                "try statement needs a catch or finally block",
            ));
        }

        Ok(Stmt::Try(self.arena.alloc(TryStmt {
            block,
            handler,
            finalizer,
            span: self.span_from(keyword.span),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Program;
    use bumpalo::Bump;

    fn parse<'ast>(source: &str, arena: &'ast Bump) -> Program<'ast> {
        match Parser::parse_program(source, arena) {
            Ok(program) => program,
            Err(errors) => panic!("parse failed: {errors}"),
        }
    }

    #[test]
    fn var_with_multiple_declarators() {
        let arena = Bump::new();
        let program = parse("var a = 1, b, c = a;", &arena);
        let Stmt::Var(var) = program.body[0] else {
            panic!("expected var");
        };
        assert_eq!(var.declarators.len(), 3);
        assert!(var.declarators[1].init.is_none());
    }

    #[test]
    fn if_else_chain() {
        let arena = Bump::new();
        let program = parse("if (a) b(); else if (c) d(); else e();", &arena);
        let Stmt::If(stmt) = program.body[0] else {
            panic!("expected if");
        };
        assert!(matches!(stmt.else_stmt, Some(Stmt::If(_))));
    }

    #[test]
    fn classic_for_with_empty_parts() {
        let arena = Bump::new();
        let program = parse("for (;;) break;", &arena);
        let Stmt::For(stmt) = program.body[0] else {
            panic!("expected for");
        };
        assert!(stmt.init.is_none() && stmt.condition.is_none() && stmt.update.is_none());
    }

    #[test]
    fn for_in_with_var_and_expression_targets() {
        let arena = Bump::new();
        let program = parse("for (var k in o) ; for (o.p in q) ;", &arena);
        assert!(matches!(
            program.body[0],
            Stmt::ForIn(ForInStmt { target: ForInTarget::Var(_), each: false, .. })
        ));
        assert!(matches!(
            program.body[1],
            Stmt::ForIn(ForInStmt { target: ForInTarget::Expr(Expr::Member(_)), .. })
        ));
    }

    #[test]
    fn for_init_with_in_inside_parens() {
        let arena = Bump::new();
        let program = parse("for (var i = ('x' in o); i; ) ;", &arena);
        assert!(matches!(program.body[0], Stmt::For(_)));
    }

    #[test]
    fn for_each() {
        let arena = Bump::new();
        let program = parse("for each (var v in list) sum += v;", &arena);
        assert!(matches!(program.body[0], Stmt::ForIn(ForInStmt { each: true, .. })));
    }

    #[test]
    fn for_each_requires_in() {
        let arena = Bump::new();
        assert!(Parser::parse_program("for each (var i = 0; i; ) ;", &arena).is_err());
    }

    #[test]
    fn do_while_semicolon_optional() {
        let arena = Bump::new();
        let program = parse("do x++; while (x < 3) y();", &arena);
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn switch_clauses_in_order() {
        let arena = Bump::new();
        let program = parse(
            "switch (x) { case 1: a(); case 2: b(); break; default: c(); }",
            &arena,
        );
        let Stmt::Switch(stmt) = program.body[0] else {
            panic!("expected switch");
        };
        assert_eq!(stmt.clauses.len(), 3);
        assert_eq!(stmt.clauses[1].body.len(), 2);
        assert!(stmt.clauses[2].is_default());
    }

    #[test]
    fn switch_duplicate_default() {
        let arena = Bump::new();
        let errors = Parser::parse_program("switch (x) { default: default: }", &arena).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::DuplicateDefault);
    }

    #[test]
    fn labelled_loop_and_labelled_break() {
        let arena = Bump::new();
        let program = parse("outer: while (a) { while (b) { break outer; } }", &arena);
        let Stmt::Labelled(labelled) = program.body[0] else {
            panic!("expected labelled");
        };
        assert_eq!(labelled.label.name, "outer");
        assert!(matches!(labelled.body, Stmt::While(_)));
    }

    #[test]
    fn break_label_must_be_on_same_line() {
        let arena = Bump::new();
        let program = parse("while (a) { break\nfoo; }", &arena);
        let Stmt::While(stmt) = program.body[0] else {
            panic!("expected while");
        };
        let Stmt::Block(block) = stmt.body else {
            panic!("expected block");
        };
        assert!(matches!(block.stmts[0], Stmt::Break(JumpStmt { label: None, .. })));
        assert_eq!(block.stmts.len(), 2);
    }

    #[test]
    fn return_value_stops_at_newline() {
        let arena = Bump::new();
        let program = parse("function f() { return\n1; }", &arena);
        let Stmt::Function(func) = program.body[0] else {
            panic!("expected function");
        };
        assert!(matches!(func.body[0], Stmt::Return(ReturnStmt { value: None, .. })));
    }

    #[test]
    fn try_forms() {
        let arena = Bump::new();
        let program = parse(
            "try { a(); } catch (e) { b(e); } try { c(); } finally { d(); } try {} catch (e) {} finally {}",
            &arena,
        );
        assert_eq!(program.body.len(), 3);
        let Stmt::Try(second) = program.body[1] else {
            panic!("expected try");
        };
        assert!(second.handler.is_none());
        assert!(second.finalizer.is_some());
    }

    #[test]
    fn try_needs_catch_or_finally() {
        let arena = Bump::new();
        let errors = Parser::parse_program("try { a(); }", &arena).unwrap_err();
        assert_eq!(
            errors.first().unwrap().kind,
            ParseErrorKind::MissingCatchOrFinally
        );
    }

    #[test]
    fn with_statement() {
        let arena = Bump::new();
        let program = parse("with (o) { x = y; }", &arena);
        assert!(matches!(program.body[0], Stmt::With(_)));
    }

    #[test]
    fn throw_needs_expression_on_same_line() {
        let arena = Bump::new();
        assert!(Parser::parse_program("throw\nerr;", &arena).is_err());
    }

    #[test]
    fn unterminated_block() {
        let arena = Bump::new();
        let errors = Parser::parse_program("{ a();", &arena).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ParseErrorKind::UnexpectedEof);
    }
}
