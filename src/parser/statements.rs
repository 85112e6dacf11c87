//! Statement parser.
//!
//! Turns a function body's token span into an ordered `StatementIR`
//! sequence, deferring to the expression parser for all expression
//! sub-trees. Guard calls (`require`/`assert`/`revert`) map to dedicated
//! IR variants, `unchecked` blocks and paired `begin-unchecked` /
//! `end-unchecked` comment markers become delimited regions, and any
//! statement shape not recognized degrades to an `Unsupported` node
//! carrying the original token text verbatim.

use crate::diagnostics::Diagnostics;
use crate::parser::expressions;
use crate::parser::scanner::{span_text, Token, TokenKind};
use crate::parser::symbols::{SymbolEntry, SymbolKind, SymbolTable};
use crate::transpiler::ast::*;
use crate::transpiler::converter;

const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];

pub struct StmtParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    symbols: &'a mut SymbolTable,
    diagnostics: &'a mut Diagnostics,
}

/// Parses one function body span. Locals declared inside land in a fresh
/// symbol scope which is popped before returning.
pub fn parse_body(
    tokens: &[Token],
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
) -> Vec<StatementIR> {
    symbols.enter_scope();
    let mut parser = StmtParser {
        tokens,
        pos: 0,
        symbols,
        diagnostics,
    };
    let statements = parser.parse_statements();
    parser.symbols.exit_scope();
    statements
}

impl<'a> StmtParser<'a> {
    fn sub(&mut self, range: std::ops::Range<usize>) -> Vec<StatementIR> {
        let mut parser = StmtParser {
            tokens: &self.tokens[range],
            pos: 0,
            symbols: &mut *self.symbols,
            diagnostics: &mut *self.diagnostics,
        };
        parser.parse_statements()
    }

    fn parse_expr(&mut self, range: std::ops::Range<usize>) -> ExpressionIR {
        expressions::parse(&self.tokens[range], self.symbols, self.diagnostics)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_code(&self) -> Option<&Token> {
        self.tokens[self.pos..].iter().find(|t| !t.is_comment())
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn advance_code(&mut self) -> Option<Token> {
        while matches!(self.tokens.get(self.pos), Some(t) if t.is_comment()) {
            self.pos += 1;
        }
        self.advance()
    }

    fn is(&self, text: &str) -> bool {
        self.peek_code().map_or(false, |t| t.is(text))
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.is(text) {
            self.advance_code();
            true
        } else {
            false
        }
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    /// Index of the bracket matching the one at `open_idx`. Returns the
    /// span end when the input is unbalanced, degrading instead of
    /// panicking on malformed source.
    fn matching(&mut self, open_idx: usize, open: &str, close: &str) -> usize {
        let mut depth = 0i32;
        for (i, token) in self.tokens.iter().enumerate().skip(open_idx) {
            if token.is(open) {
                depth += 1;
            } else if token.is(close) {
                depth -= 1;
                if depth <= 0 {
                    return i;
                }
            }
        }
        self.diagnostics
            .warning(self.line(), format!("unbalanced `{}` in function body", open));
        self.tokens.len()
    }

    /// Index of the next `;` at bracket depth zero, or the span end.
    fn statement_end(&self) -> usize {
        let mut depth = 0i32;
        for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
            if token.is("(") || token.is("[") || token.is("{") {
                depth += 1;
            } else if token.is(")") || token.is("]") || token.is("}") {
                depth -= 1;
            } else if token.is(";") && depth == 0 {
                return i;
            }
        }
        self.tokens.len()
    }

    fn parse_statements(&mut self) -> Vec<StatementIR> {
        let mut statements = Vec::new();
        while self.pos < self.tokens.len() {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> Option<StatementIR> {
        let token = self.peek()?.clone();

        if token.is_comment() {
            self.advance();
            if token.text.contains("begin-unchecked") {
                return Some(self.parse_marked_unchecked());
            }
            return Some(StatementIR::Comment(token.text));
        }

        match token.kind {
            TokenKind::Keyword => match token.text.as_str() {
                "if" => Some(self.parse_if()),
                "while" => Some(self.parse_while()),
                "do" => Some(self.parse_do_while()),
                "for" => Some(self.parse_for()),
                "return" => Some(self.parse_return()),
                "emit" => Some(self.parse_emit()),
                "require" | "assert" => Some(self.parse_require(&token.text)),
                "revert" => Some(self.parse_revert()),
                "unchecked" => Some(self.parse_unchecked()),
                "delete" => Some(self.parse_delete()),
                "break" => {
                    self.advance_code();
                    self.eat(";");
                    Some(StatementIR::Break)
                }
                "continue" => {
                    self.advance_code();
                    self.eat(";");
                    Some(StatementIR::Continue)
                }
                "try" => Some(self.parse_try_catch()),
                "assembly" => Some(self.parse_assembly()),
                _ => Some(self.parse_unrecognized()),
            },
            TokenKind::Punctuation if token.text == "{" => {
                let close = self.matching(self.pos, "{", "}");
                let start = self.pos + 1;
                self.pos = close.min(self.tokens.len());
                if self.pos < self.tokens.len() {
                    self.pos += 1; // past the closing brace
                }
                self.symbols.enter_scope();
                let body = self.sub(start..close);
                self.symbols.exit_scope();
                Some(StatementIR::Block(body))
            }
            TokenKind::Punctuation if token.text == ";" => {
                self.advance();
                None
            }
            TokenKind::Identifier if token.text == "_" => {
                // the `_;` placeholder inside a modifier body
                self.advance_code();
                self.eat(";");
                Some(StatementIR::ModifierPlaceholder)
            }
            _ => {
                if let Some(declaration) = self.try_parse_declaration() {
                    return Some(declaration);
                }
                Some(self.parse_expression_statement())
            }
        }
    }

    /// A run of statements between `// begin-unchecked` and
    /// `// end-unchecked` comments collapses into one region node, in
    /// original order, nothing gained or lost.
    fn parse_marked_unchecked(&mut self) -> StatementIR {
        self.diagnostics.info(
            self.line(),
            "unchecked region preserved for manual review",
        );
        let mut body = Vec::new();
        while let Some(token) = self.peek() {
            if token.is_comment() && token.text.contains("end-unchecked") {
                self.advance();
                break;
            }
            if let Some(statement) = self.parse_statement() {
                body.push(statement);
            }
        }
        StatementIR::Unchecked(body)
    }

    fn parse_condition(&mut self) -> ExpressionIR {
        if !self.is("(") {
            self.diagnostics
                .warning(self.line(), "expected `(` after control-flow keyword");
            return ExpressionIR::new(ExprKind::Unsupported(String::new()), SolType::Unknown);
        }
        // position of the "(" as an absolute index
        let open = self.pos
            + self.tokens[self.pos..]
                .iter()
                .position(|t| t.is("("))
                .unwrap_or(0);
        let close = self.matching(open, "(", ")");
        let condition = self.parse_expr(open + 1..close);
        self.pos = (close + 1).min(self.tokens.len());
        condition
    }

    fn parse_branch(&mut self) -> Vec<StatementIR> {
        if self.is("{") {
            match self.parse_statement() {
                Some(StatementIR::Block(body)) => body,
                Some(other) => vec![other],
                None => Vec::new(),
            }
        } else {
            self.parse_statement().into_iter().collect()
        }
    }

    fn parse_if(&mut self) -> StatementIR {
        self.advance_code(); // `if`
        let condition = self.parse_condition();
        let then_branch = self.parse_branch();
        let else_branch = if self.eat("else") {
            if self.is("if") {
                // else-if chains nest to the right
                Some(self.parse_statement().into_iter().collect())
            } else {
                Some(self.parse_branch())
            }
        } else {
            None
        };
        StatementIR::If {
            condition,
            then_branch,
            else_branch,
        }
    }

    fn parse_while(&mut self) -> StatementIR {
        self.advance_code();
        let condition = self.parse_condition();
        let body = self.parse_branch();
        StatementIR::While { condition, body }
    }

    fn parse_do_while(&mut self) -> StatementIR {
        self.advance_code(); // `do`
        let body = self.parse_branch();
        if !self.eat("while") {
            self.diagnostics
                .warning(self.line(), "expected `while` after `do` block");
        }
        let condition = self.parse_condition();
        self.eat(";");
        StatementIR::DoWhile { body, condition }
    }

    fn parse_for(&mut self) -> StatementIR {
        self.advance_code(); // `for`
        if !self.is("(") {
            self.diagnostics
                .warning(self.line(), "expected `(` after `for`");
            return self.parse_unrecognized();
        }
        let open = self.pos
            + self.tokens[self.pos..]
                .iter()
                .position(|t| t.is("("))
                .unwrap_or(0);
        let close = self.matching(open, "(", ")");
        let mut semis = Vec::new();
        let mut depth = 0i32;
        for i in open + 1..close {
            let token = &self.tokens[i];
            if token.is("(") || token.is("[") {
                depth += 1;
            } else if token.is(")") || token.is("]") {
                depth -= 1;
            } else if token.is(";") && depth == 0 {
                semis.push(i);
            }
        }
        self.symbols.enter_scope();
        let (init, condition, update) = if semis.len() == 2 {
            let init = self
                .sub(open + 1..semis[0] + 1)
                .into_iter()
                .next()
                .map(Box::new);
            let condition = if semis[0] + 1 < semis[1] {
                Some(self.parse_expr(semis[0] + 1..semis[1]))
            } else {
                None
            };
            let update = self
                .sub(semis[1] + 1..close)
                .into_iter()
                .next()
                .map(Box::new);
            (init, condition, update)
        } else {
            self.diagnostics
                .warning(self.line(), "malformed `for` header");
            (None, None, None)
        };
        self.pos = (close + 1).min(self.tokens.len());
        let body = self.parse_branch();
        self.symbols.exit_scope();
        StatementIR::For {
            init,
            condition,
            update,
            body,
        }
    }

    fn parse_return(&mut self) -> StatementIR {
        self.advance_code(); // `return`
        if self.eat(";") {
            return StatementIR::Return(None);
        }
        let end = self.statement_end();
        let mut value = self.parse_expr(self.pos..end);
        value.mark_clone();
        self.pos = (end + 1).min(self.tokens.len());
        StatementIR::Return(Some(value))
    }

    fn parse_emit(&mut self) -> StatementIR {
        self.advance_code(); // `emit`
        let event = match self.advance_code() {
            Some(token) if token.kind == TokenKind::Identifier => token.text,
            _ => {
                self.diagnostics
                    .warning(self.line(), "expected event name after `emit`");
                return self.parse_unrecognized();
            }
        };
        let mut args = Vec::new();
        if self.is("(") {
            let open = self.pos
                + self.tokens[self.pos..]
                    .iter()
                    .position(|t| t.is("("))
                    .unwrap_or(0);
            let close = self.matching(open, "(", ")");
            for part in split_commas(&self.tokens[open + 1..close]) {
                if !part.is_empty() {
                    args.push(expressions::parse(part, self.symbols, self.diagnostics));
                }
            }
            self.pos = (close + 1).min(self.tokens.len());
        }
        self.eat(";");
        StatementIR::Emit { event, args }
    }

    fn parse_require(&mut self, keyword: &str) -> StatementIR {
        self.advance_code(); // `require` / `assert`
        if !self.is("(") {
            self.diagnostics
                .warning(self.line(), format!("expected `(` after `{}`", keyword));
            return self.parse_unrecognized();
        }
        let open = self.pos
            + self.tokens[self.pos..]
                .iter()
                .position(|t| t.is("("))
                .unwrap_or(0);
        let close = self.matching(open, "(", ")");
        let parts = split_commas(&self.tokens[open + 1..close]);
        let condition = match parts.first() {
            Some(part) => expressions::parse(part, self.symbols, self.diagnostics),
            None => ExpressionIR::new(ExprKind::BoolLiteral(false), SolType::Bool),
        };
        let message = parts.get(1).map(|part| message_text(part));
        self.pos = (close + 1).min(self.tokens.len());
        self.eat(";");
        StatementIR::Require { condition, message }
    }

    fn parse_revert(&mut self) -> StatementIR {
        let line = self.line();
        let start = self.pos;
        self.advance_code(); // `revert`
        if self.is("(") {
            let open = self.pos
                + self.tokens[self.pos..]
                    .iter()
                    .position(|t| t.is("("))
                    .unwrap_or(0);
            let close = self.matching(open, "(", ")");
            let inner = &self.tokens[open + 1..close];
            let message = if inner.is_empty() {
                None
            } else {
                Some(message_text(inner))
            };
            self.pos = (close + 1).min(self.tokens.len());
            self.eat(";");
            return StatementIR::Revert { message };
        }
        // `revert CustomError(..)` has no uniform translation
        let end = self.statement_end();
        let raw = span_text(&self.tokens[start..end]);
        self.pos = (end + 1).min(self.tokens.len());
        self.diagnostics.warning(
            line,
            "`revert` with a custom error is not translated, left as a marker",
        );
        StatementIR::Unsupported { raw, line }
    }

    fn parse_unchecked(&mut self) -> StatementIR {
        self.diagnostics.info(
            self.line(),
            "unchecked region preserved for manual review",
        );
        self.advance_code(); // `unchecked`
        if !self.is("{") {
            self.diagnostics
                .warning(self.line(), "expected `{` after `unchecked`");
            return self.parse_unrecognized();
        }
        let open = self.pos
            + self.tokens[self.pos..]
                .iter()
                .position(|t| t.is("{"))
                .unwrap_or(0);
        let close = self.matching(open, "{", "}");
        self.symbols.enter_scope();
        let body = self.sub(open + 1..close);
        self.symbols.exit_scope();
        self.pos = (close + 1).min(self.tokens.len());
        StatementIR::Unchecked(body)
    }

    fn parse_delete(&mut self) -> StatementIR {
        self.advance_code(); // `delete`
        let end = self.statement_end();
        let target = self.parse_expr(self.pos..end);
        self.pos = (end + 1).min(self.tokens.len());
        StatementIR::Delete(target)
    }

    /// `try`/`catch` chains are preserved verbatim for manual porting.
    fn parse_try_catch(&mut self) -> StatementIR {
        let line = self.line();
        let start = self.pos;
        self.advance_code(); // `try`
        loop {
            let open = match self.tokens[self.pos..].iter().position(|t| t.is("{")) {
                Some(offset) => self.pos + offset,
                None => {
                    self.pos = self.tokens.len();
                    break;
                }
            };
            let close = self.matching(open, "{", "}");
            self.pos = (close + 1).min(self.tokens.len());
            if !self.is("catch") {
                break;
            }
            self.advance_code();
        }
        let raw = span_text(&self.tokens[start..self.pos]);
        self.diagnostics.warning_with_marker(
            line,
            "`try`/`catch` blocks are not translated",
            "Please handle try/catch blocks manually",
        );
        StatementIR::Unsupported { raw, line }
    }

    fn parse_assembly(&mut self) -> StatementIR {
        let line = self.line();
        let start = self.pos;
        self.advance_code(); // `assembly`
        if let Some(offset) = self.tokens[self.pos..].iter().position(|t| t.is("{")) {
            let open = self.pos + offset;
            let close = self.matching(open, "{", "}");
            self.pos = (close + 1).min(self.tokens.len());
        } else {
            self.pos = self.tokens.len();
        }
        let raw = span_text(&self.tokens[start..self.pos]);
        self.diagnostics.warning_with_marker(
            line,
            "inline assembly is not translated",
            "Please handle assembly blocks manually",
        );
        StatementIR::Unsupported { raw, line }
    }

    /// Attempts `<type> [location] <name> [= <value>];`. Restores the
    /// cursor and returns `None` when the shape does not match, so the
    /// caller can fall back to expression parsing.
    fn try_parse_declaration(&mut self) -> Option<StatementIR> {
        let saved = self.pos;
        let ty = match self.try_parse_local_type() {
            Some(ty) => ty,
            None => {
                self.pos = saved;
                return None;
            }
        };
        while matches!(
            self.peek_code().map(|t| t.text.as_str()),
            Some("memory") | Some("storage") | Some("calldata")
        ) {
            self.advance_code();
        }
        let name = match self.peek_code() {
            Some(token) if token.kind == TokenKind::Identifier => {
                let name = token.text.clone();
                self.advance_code();
                name
            }
            _ => {
                self.pos = saved;
                return None;
            }
        };
        let value = if self.eat("=") {
            let end = self.statement_end();
            let mut value = self.parse_expr(self.pos..end);
            value.mark_clone();
            self.pos = end;
            Some(value)
        } else if self.is(";") {
            None
        } else {
            self.pos = saved;
            return None;
        };
        self.eat(";");
        self.symbols.declare(SymbolEntry {
            name: name.clone(),
            ty: ty.clone(),
            kind: SymbolKind::Local,
            visibility: Visibility::Private,
        });
        Some(StatementIR::Declaration { name, ty, value })
    }

    fn try_parse_local_type(&mut self) -> Option<SolType> {
        let token = self.peek_code()?.clone();
        let mut ty = if let Some(elementary) = converter::elementary_type(&token.text) {
            self.advance_code();
            elementary
        } else if token.kind == TokenKind::Identifier
            && matches!(
                self.symbols.kind_of(&token.text),
                Some(SymbolKind::Struct) | Some(SymbolKind::Enum)
            )
        {
            self.advance_code();
            SolType::Custom(token.text)
        } else {
            return None;
        };
        while self.is("[") {
            self.advance_code();
            // fixed sizes are dropped, arrays stay arrays
            while !self.is("]") && self.peek_code().is_some() {
                self.advance_code();
            }
            if !self.eat("]") {
                return None;
            }
            ty = SolType::Array(Box::new(ty));
        }
        Some(ty)
    }

    fn parse_expression_statement(&mut self) -> StatementIR {
        let line = self.line();
        let end = self.statement_end();
        let slice_start = self.pos;

        // assignment operators bind loosest; find one at depth zero
        let mut depth = 0i32;
        let mut assign_at = None;
        for i in slice_start..end {
            let token = &self.tokens[i];
            if token.is("(") || token.is("[") || token.is("{") {
                depth += 1;
            } else if token.is(")") || token.is("]") || token.is("}") {
                depth -= 1;
            } else if depth == 0
                && token.kind == TokenKind::Operator
                && ASSIGN_OPS.contains(&token.text.as_str())
            {
                assign_at = Some(i);
                break;
            }
        }

        let statement = if let Some(idx) = assign_at {
            let op = AssignOp::from_str(&self.tokens[idx].text).unwrap_or(AssignOp::Assign);
            let target = self.parse_expr(slice_start..idx);
            let mut value = self.parse_expr(idx + 1..end);
            value.mark_clone();
            StatementIR::Assign { target, op, value }
        } else {
            let expr = self.parse_expr(slice_start..end);
            match expr.kind {
                // `x++;` / `x--;` become compound assignments
                ExprKind::Unary {
                    op: UnaryOp::Inc,
                    operand,
                } => StatementIR::Assign {
                    target: *operand,
                    op: AssignOp::Add,
                    value: ExpressionIR::new(
                        ExprKind::NumberLiteral(String::from("1")),
                        SolType::Uint(256),
                    ),
                },
                ExprKind::Unary {
                    op: UnaryOp::Dec,
                    operand,
                } => StatementIR::Assign {
                    target: *operand,
                    op: AssignOp::Sub,
                    value: ExpressionIR::new(
                        ExprKind::NumberLiteral(String::from("1")),
                        SolType::Uint(256),
                    ),
                },
                ExprKind::Unsupported(raw) => StatementIR::Unsupported { raw, line },
                kind => StatementIR::Expression(ExpressionIR {
                    kind,
                    ty: expr.ty,
                    needs_clone: expr.needs_clone,
                }),
            }
        };
        self.pos = (end + 1).min(self.tokens.len());
        statement
    }

    /// Last-resort fallback: swallow up to the next statement boundary
    /// and keep the original text.
    fn parse_unrecognized(&mut self) -> StatementIR {
        let line = self.line();
        let end = self.statement_end();
        let raw = span_text(&self.tokens[self.pos..end]);
        self.pos = (end + 1).min(self.tokens.len());
        self.diagnostics.warning(
            line,
            format!("unrecognized statement `{}` left as a marker", raw),
        );
        StatementIR::Unsupported { raw, line }
    }
}

/// Splits a token span on commas at bracket depth zero.
fn split_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.is("(") || token.is("[") || token.is("{") {
            depth += 1;
        } else if token.is(")") || token.is("]") || token.is("}") {
            depth -= 1;
        } else if token.is(",") && depth == 0 {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    if start < tokens.len() {
        parts.push(&tokens[start..]);
    }
    parts
}

/// Failure message for a guard: a lone string literal keeps its text,
/// anything else keeps its reconstructed source.
fn message_text(tokens: &[Token]) -> String {
    let code: Vec<&Token> = tokens.iter().filter(|t| !t.is_comment()).collect();
    match code.as_slice() {
        [token] if token.kind == TokenKind::StringLiteral => token.text.clone(),
        _ => span_text(tokens),
    }
}
