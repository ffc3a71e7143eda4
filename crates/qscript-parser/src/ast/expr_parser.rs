//! Expression parsing.
//!
//! Binary operators use precedence climbing over [`BinaryOp::binding_power`];
//! assignment, conditional, unary and postfix forms have dedicated levels:
//!
//! ```text
//! expr        := assignment (',' assignment)*
//! assignment  := conditional (assign_op assignment)?
//! conditional := binary ('?' assignment ':' assignment)?
//! binary      := unary (binop unary)*
//! unary       := (unary_op | '++' | '--') unary | postfix
//! postfix     := lhs ('++' | '--')?          (no line break before the operator)
//! lhs         := (new_expr | primary) ('.' name | '[' expr ']' | arguments)*
//! ```
//!
//! `allow_in` is false while parsing the head of a `for` statement so that
//! `in` is left for the for-in form.

use bumpalo::collections::Vec as BVec;
use qscript_core::{ParseError, ParseErrorKind, Span};

use crate::ast::expr::*;
use crate::ast::parser::Parser;
use crate::ast::{AssignOp, BinaryOp, UnaryOp, UpdateOp};
use crate::lexer::{TokenKind, literal};

type Result<T> = std::result::Result<T, ParseError>;

impl<'ast> Parser<'ast> {
    /// Parse a full (comma) expression.
    pub fn parse_expr(&mut self, allow_in: bool) -> Result<Expr<'ast>> {
        let mut expr = self.parse_assignment(allow_in)?;
        while self.eat(TokenKind::Comma).is_some() {
            let right = self.parse_assignment(allow_in)?;
            let span = expr.span().to(right.span());
            expr = Expr::Comma(self.arena.alloc(CommaExpr {
                left: self.arena.alloc(expr),
                right: self.arena.alloc(right),
                span,
            }));
        }
        Ok(expr)
    }

    /// Every nested expression, whether an array element, an argument, a
    /// parenthesized group or the right side of `=` or `?:`, starts here, so
    /// this is where nesting is counted.
    pub fn parse_assignment(&mut self, allow_in: bool) -> Result<Expr<'ast>> {
        let token = self.peek();
        self.enter(token.span)?;
        let result = self.parse_assignment_inner(allow_in);
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self, allow_in: bool) -> Result<Expr<'ast>> {
        let target = self.parse_conditional(allow_in)?;
        let Some(op) = AssignOp::from_token(self.peek().kind) else {
            return Ok(target);
        };
        let op_token = self.advance();
        if !target.is_reference() {
            return Err(invalid_target(target.span(), op_token.lexeme));
        }
        let value = self.parse_assignment(allow_in)?;
        let span = target.span().to(value.span());
        Ok(Expr::Assign(self.arena.alloc(AssignExpr {
            target: self.arena.alloc(target),
            op,
            value: self.arena.alloc(value),
            span,
        })))
    }

    fn parse_conditional(&mut self, allow_in: bool) -> Result<Expr<'ast>> {
        let condition = self.parse_binary(0, allow_in)?;
        if self.eat(TokenKind::Question).is_none() {
            return Ok(condition);
        }
        let then_expr = self.parse_assignment(true)?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.parse_assignment(allow_in)?;
        let span = condition.span().to(else_expr.span());
        Ok(Expr::Conditional(self.arena.alloc(ConditionalExpr {
            condition: self.arena.alloc(condition),
            then_expr: self.arena.alloc(then_expr),
            else_expr: self.arena.alloc(else_expr),
            span,
        })))
    }

    fn parse_binary(&mut self, min_bp: u8, allow_in: bool) -> Result<Expr<'ast>> {
        let mut left = self.parse_unary()?;
        loop {
            let Some(op) = BinaryOp::from_token(self.peek().kind) else {
                break;
            };
            if op == BinaryOp::In && !allow_in {
                break;
            }
            let (left_bp, right_bp) = op.binding_power();
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let right = self.parse_binary(right_bp, allow_in)?;
            let span = left.span().to(right.span());
            left = Expr::Binary(self.arena.alloc(BinaryExpr {
                left: self.arena.alloc(left),
                op,
                right: self.arena.alloc(right),
                span,
            }));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr<'ast>> {
        let token = self.peek();
        self.enter(token.span)?;
        let result = self.parse_unary_inner();
        self.leave();
        result
    }

    fn parse_unary_inner(&mut self) -> Result<Expr<'ast>> {
        let token = self.peek();

        if let Some(op) = UnaryOp::from_token(token.kind) {
            self.advance();
            let operand = self.parse_unary()?;
            let span = token.span.to(operand.span());
            return Ok(Expr::Unary(self.arena.alloc(UnaryExpr {
                op,
                operand: self.arena.alloc(operand),
                span,
            })));
        }

        let update = match token.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let operand = self.parse_unary()?;
            let span = token.span.to(operand.span());
            return self.make_update(op, true, operand, span);
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr<'ast>> {
        let operand = self.parse_lhs()?;
        let next = self.peek();
        if next.newline_before {
            return Ok(operand);
        }
        let op = match next.kind {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(operand),
        };
        self.advance();
        let span = operand.span().to(next.span);
        self.make_update(op, false, operand, span)
    }

    fn make_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        operand: Expr<'ast>,
        span: Span,
    ) -> Result<Expr<'ast>> {
        if !operand.is_reference() {
            return Err(ParseError::new(
                ParseErrorKind::InvalidAssignmentTarget,
                operand.span(),
                "operand of increment or decrement is not assignable",
            ));
        }
        Ok(Expr::Update(self.arena.alloc(UpdateExpr {
            op,
            prefix,
            operand: self.arena.alloc(operand),
            span,
        })))
    }

    /// Member accesses, calls and `new`.
    fn parse_lhs(&mut self) -> Result<Expr<'ast>> {
        let base = if self.check(TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_accessors(base, true)
    }

    /// `new` binds to the nearest member expression, so `new a.b.C(1).d`
    /// constructs `a.b.C` and then reads `d` from the result.
    fn parse_new(&mut self) -> Result<Expr<'ast>> {
        let new_token = self.advance();
        self.enter(new_token.span)?;
        let callee = if self.check(TokenKind::New) {
            self.parse_new()
        } else {
            self.parse_primary()
        };
        self.leave();
        let callee = self.parse_accessors(callee?, false)?;

        let args = if self.check(TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            &[]
        };
        let span = self.span_from(new_token.span);
        Ok(Expr::New(self.arena.alloc(NewExpr {
            callee: self.arena.alloc(callee),
            args,
            span,
        })))
    }

    fn parse_accessors(&mut self, mut expr: Expr<'ast>, allow_call: bool) -> Result<Expr<'ast>> {
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.advance();
                    if name.kind != TokenKind::Identifier && !name.kind.is_keyword() {
                        return Err(expected_property_name(name.span, name.kind));
                    }
                    let span = expr.span().to(name.span);
                    expr = Expr::Member(self.arena.alloc(MemberExpr {
                        object: self.arena.alloc(expr),
                        property: Ident::new(name.lexeme, name.span),
                        span,
                    }));
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let index = self.parse_expr(true)?;
                    let close = self.expect(TokenKind::RightBracket)?;
                    let span = expr.span().to(close.span);
                    expr = Expr::Index(self.arena.alloc(IndexExpr {
                        object: self.arena.alloc(expr),
                        index: self.arena.alloc(index),
                        span,
                    }));
                }
                TokenKind::LeftParen if allow_call => {
                    let args = self.parse_arguments()?;
                    let span = self.span_from(expr.span());
                    expr = Expr::Call(self.arena.alloc(CallExpr {
                        callee: self.arena.alloc(expr),
                        args,
                        span,
                    }));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<&'ast [Expr<'ast>]> {
        self.expect(TokenKind::LeftParen)?;
        let mut args = BVec::new_in(self.arena);
        if self.eat(TokenKind::RightParen).is_some() {
            return Ok(args.into_bump_slice());
        }
        loop {
            args.push(self.parse_assignment(true)?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;
        Ok(args.into_bump_slice())
    }

    fn parse_primary(&mut self) -> Result<Expr<'ast>> {
        let token = self.peek();
        let literal = |kind| Expr::Literal(LiteralExpr { kind, span: token.span });

        match token.kind {
            TokenKind::This => {
                self.advance();
                Ok(Expr::This(token.span))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Ident(Ident::new(token.lexeme, token.span)))
            }
            TokenKind::Number => {
                self.advance();
                let value = self.number_value(token.lexeme, token.span)?;
                Ok(literal(LiteralKind::Number(value)))
            }
            TokenKind::String => {
                self.advance();
                let value = self.string_value(token.lexeme, token.span)?;
                Ok(literal(LiteralKind::String(value)))
            }
            TokenKind::True => {
                self.advance();
                Ok(literal(LiteralKind::Boolean(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(literal(LiteralKind::Boolean(false)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(literal(LiteralKind::Null))
            }
            TokenKind::RegExp => {
                self.advance();
                let (pattern, flags) = literal::split_regexp(token.lexeme).unwrap_or(("", ""));
                Ok(Expr::RegExp(RegExpExpr {
                    pattern: self.arena.alloc_str(pattern),
                    flags: self.arena.alloc_str(flags),
                    span: token.span,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expr(true)?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::LeftBrace => self.parse_object(),
            TokenKind::Function => {
                let func = self.parse_function(false)?;
                Ok(Expr::Function(func))
            }
            TokenKind::Eof => Err(ParseError::unexpected_eof(token.span)),
            other => Err(ParseError::expected_expression(token.span, other.as_str())),
        }
    }

    fn parse_array(&mut self) -> Result<Expr<'ast>> {
        let open = self.expect(TokenKind::LeftBracket)?;
        let mut elements = BVec::new_in(self.arena);
        loop {
            if self.check(TokenKind::RightBracket) {
                break;
            }
            if self.eat(TokenKind::Comma).is_some() {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_assignment(true)?));
            if self.check(TokenKind::RightBracket) {
                break;
            }
            self.expect(TokenKind::Comma)?;
        }
        self.expect(TokenKind::RightBracket)?;
        Ok(Expr::Array(self.arena.alloc(ArrayExpr {
            elements: elements.into_bump_slice(),
            span: self.span_from(open.span),
        })))
    }

    fn parse_object(&mut self) -> Result<Expr<'ast>> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let mut properties = BVec::new_in(self.arena);
        while !self.check(TokenKind::RightBrace) {
            let key_token = self.advance();
            let key = match key_token.kind {
                TokenKind::Identifier => PropertyKey::Ident(key_token.lexeme),
                kind if kind.is_keyword() => PropertyKey::Ident(key_token.lexeme),
                TokenKind::String => {
                    PropertyKey::String(self.string_value(key_token.lexeme, key_token.span)?)
                }
                TokenKind::Number => {
                    PropertyKey::Number(self.number_value(key_token.lexeme, key_token.span)?)
                }
                other => {
                    return Err(expected_property_name(key_token.span, other));
                }
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_assignment(true)?;
            properties.push(Property {
                key,
                value,
                span: key_token.span.to(value.span()),
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(Expr::Object(self.arena.alloc(ObjectExpr {
            properties: properties.into_bump_slice(),
            span: self.span_from(open.span),
        })))
    }

    /// `function [name] (params) { body }`. Declarations pass `require_name`.
    pub(super) fn parse_function(&mut self, require_name: bool) -> Result<&'ast Function<'ast>> {
        let keyword = self.expect(TokenKind::Function)?;
        let name = if require_name || self.check(TokenKind::Identifier) {
            let token = self.expect_identifier()?;
            Some(Ident::new(token.lexeme, token.span))
        } else {
            None
        };

        self.expect(TokenKind::LeftParen)?;
        let mut params = BVec::new_in(self.arena);
        if !self.check(TokenKind::RightParen) {
            loop {
                let token = self.expect_identifier()?;
                params.push(Ident::new(token.lexeme, token.span));
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen)?;

        let body = self.parse_block()?;
        Ok(self.arena.alloc(Function {
            name,
            params: params.into_bump_slice(),
            body: body.stmts,
            span: self.span_from(keyword.span),
        }))
    }

    fn number_value(&self, lexeme: &str, span: Span) -> Result<f64> {
        literal::parse_number(lexeme).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::Lexical,
                span,
                format!("invalid numeric literal '{lexeme}'"),
            )
        })
    }

    fn string_value(&self, lexeme: &str, span: Span) -> Result<&'ast str> {
        match literal::cook_string(lexeme) {
            Some(text) => Ok(self.arena.alloc_str(&text)),
            None => Err(ParseError::new(
                ParseErrorKind::Lexical,
                span,
                "invalid escape sequence in string literal",
            )),
        }
    }
}

// Error construction is kept out of line so the frames of the recursive
// parse functions stay small.

#[cold]
#[inline(never)]
fn expected_property_name(span: Span, found: TokenKind) -> ParseError {
    ParseError::new(
        ParseErrorKind::ExpectedPropertyName,
        span,
        format!("expected property name, found {found}"),
    )
}

#[cold]
#[inline(never)]
fn invalid_target(span: Span, operator: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::InvalidAssignmentTarget,
        span,
        format!("left-hand side of '{operator}' is not assignable"),
    )
}
