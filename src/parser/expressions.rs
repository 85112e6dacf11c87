//! Expression parser.
//!
//! Precedence-climbing parse of a token span into one `ExpressionIR`
//! root, following Solidity's precedence and associativity rules
//! (exponentiation highest and right-associative, assignment handled at
//! statement level). Targeted rewrite rules are applied while the tree is
//! built: `type(T).max`/`.min` become destination limit constants,
//! `msg`/`block` members become environment accessors, `address(0)`
//! comparisons collapse to zero checks.
//!
//! Parsing is total: an unrecognized shape degrades to an `Unsupported`
//! node carrying the original text plus a diagnostic, and a failed type
//! inference tags the node `Unknown` instead of aborting.

use crate::diagnostics::Diagnostics;
use crate::parser::scanner::{span_text, Token, TokenKind};
use crate::parser::symbols::{SymbolKind, SymbolTable};
use crate::transpiler::ast::*;
use crate::transpiler::converter;

/// Builtins with no mechanical ink! counterpart; calls degrade to marked
/// placeholders instead of emitting code that silently means something else.
const UNSUPPORTED_BUILTINS: &[&str] = &[
    "keccak256",
    "sha256",
    "ripemd160",
    "ecrecover",
    "gasleft",
    "selfdestruct",
    "blockhash",
    "addmod",
    "mulmod",
];

pub struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    symbols: &'a SymbolTable,
    diagnostics: &'a mut Diagnostics,
}

/// Parses a whole token span as one expression. Leftover tokens mean the
/// span was not a single well-formed expression; the whole span then
/// degrades to an `Unsupported` node so no text is lost.
pub fn parse(tokens: &[Token], symbols: &SymbolTable, diagnostics: &mut Diagnostics) -> ExpressionIR {
    let mut parser = ExprParser::new(tokens, symbols, diagnostics);
    let expr = parser.parse_expression();
    if parser.peek().is_some() {
        let line = tokens.first().map(|t| t.line).unwrap_or(0);
        parser
            .diagnostics
            .warning(line, format!("unable to parse expression `{}`", span_text(tokens)));
        return ExpressionIR::new(ExprKind::Unsupported(span_text(tokens)), SolType::Unknown);
    }
    expr
}

impl<'a> ExprParser<'a> {
    pub fn new(
        tokens: &'a [Token],
        symbols: &'a SymbolTable,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        ExprParser {
            tokens,
            pos: 0,
            symbols,
            diagnostics,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens[self.pos..].iter().find(|t| !t.is_comment())
    }

    fn advance(&mut self) -> Option<Token> {
        while matches!(self.tokens.get(self.pos), Some(t) if t.is_comment()) {
            self.pos += 1;
        }
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is(&self, text: &str) -> bool {
        self.peek().map_or(false, |t| t.is(text))
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.is(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> bool {
        if self.eat(text) {
            true
        } else {
            self.diagnostics
                .warning(self.line(), format!("expected `{}` in expression", text));
            false
        }
    }

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    pub fn parse_expression(&mut self) -> ExpressionIR {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> ExpressionIR {
        let condition = self.parse_logical_or();
        if self.eat("?") {
            let then_value = self.parse_expression();
            self.expect(":");
            let else_value = self.parse_ternary();
            let ty = then_value.ty.clone();
            return ExpressionIR::new(
                ExprKind::Ternary {
                    condition: Box::new(condition),
                    then_value: Box::new(then_value),
                    else_value: Box::new(else_value),
                },
                ty,
            );
        }
        condition
    }

    fn parse_logical_or(&mut self) -> ExpressionIR {
        let mut left = self.parse_logical_and();
        while self.eat("||") {
            let right = self.parse_logical_and();
            left = self.binary(BinaryOp::Or, left, right);
        }
        left
    }

    fn parse_logical_and(&mut self) -> ExpressionIR {
        let mut left = self.parse_equality();
        while self.eat("&&") {
            let right = self.parse_equality();
            left = self.binary(BinaryOp::And, left, right);
        }
        left
    }

    fn parse_equality(&mut self) -> ExpressionIR {
        let mut left = self.parse_relational();
        loop {
            let op = if self.eat("==") {
                BinaryOp::Eq
            } else if self.eat("!=") {
                BinaryOp::Ne
            } else {
                break;
            };
            let right = self.parse_relational();
            left = self.equality(op, left, right);
        }
        left
    }

    /// `x == address(0)` collapses to a zero check on the account id; the
    /// negated comparison wraps it in `!`.
    fn equality(&mut self, op: BinaryOp, left: ExpressionIR, right: ExpressionIR) -> ExpressionIR {
        let left_zero = matches!(left.kind, ExprKind::ZeroAddress);
        let right_zero = matches!(right.kind, ExprKind::ZeroAddress);
        if left_zero || right_zero {
            let operand = if left_zero { right } else { left };
            let check = ExpressionIR::new(ExprKind::IsZero(Box::new(operand)), SolType::Bool);
            return if op == BinaryOp::Eq {
                check
            } else {
                ExpressionIR::new(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: Box::new(check),
                    },
                    SolType::Bool,
                )
            };
        }
        self.binary(op, left, right)
    }

    fn parse_relational(&mut self) -> ExpressionIR {
        let mut left = self.parse_bitwise_or();
        loop {
            let op = if self.eat("<=") {
                BinaryOp::Le
            } else if self.eat(">=") {
                BinaryOp::Ge
            } else if self.eat("<") {
                BinaryOp::Lt
            } else if self.eat(">") {
                BinaryOp::Gt
            } else {
                break;
            };
            let right = self.parse_bitwise_or();
            left = self.binary(op, left, right);
        }
        left
    }

    fn parse_bitwise_or(&mut self) -> ExpressionIR {
        let mut left = self.parse_bitwise_xor();
        while self.eat("|") {
            let right = self.parse_bitwise_xor();
            left = self.binary(BinaryOp::BitOr, left, right);
        }
        left
    }

    fn parse_bitwise_xor(&mut self) -> ExpressionIR {
        let mut left = self.parse_bitwise_and();
        while self.eat("^") {
            let right = self.parse_bitwise_and();
            left = self.binary(BinaryOp::BitXor, left, right);
        }
        left
    }

    fn parse_bitwise_and(&mut self) -> ExpressionIR {
        let mut left = self.parse_shift();
        while self.eat("&") {
            let right = self.parse_shift();
            left = self.binary(BinaryOp::BitAnd, left, right);
        }
        left
    }

    fn parse_shift(&mut self) -> ExpressionIR {
        let mut left = self.parse_additive();
        loop {
            let op = if self.eat("<<") {
                BinaryOp::Shl
            } else if self.eat(">>") {
                BinaryOp::Shr
            } else {
                break;
            };
            let right = self.parse_additive();
            left = self.binary(op, left, right);
        }
        left
    }

    fn parse_additive(&mut self) -> ExpressionIR {
        let mut left = self.parse_multiplicative();
        loop {
            let op = if self.eat("+") {
                BinaryOp::Add
            } else if self.eat("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.parse_multiplicative();
            left = self.binary(op, left, right);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> ExpressionIR {
        let mut left = self.parse_power();
        loop {
            let op = if self.eat("*") {
                BinaryOp::Mul
            } else if self.eat("/") {
                BinaryOp::Div
            } else if self.eat("%") {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.parse_power();
            left = self.binary(op, left, right);
        }
        left
    }

    fn parse_power(&mut self) -> ExpressionIR {
        let base = self.parse_unary();
        if self.eat("**") {
            // right-associative
            let exponent = self.parse_power();
            return self.binary(BinaryOp::Pow, base, exponent);
        }
        base
    }

    fn parse_unary(&mut self) -> ExpressionIR {
        let op = if self.eat("!") {
            Some(UnaryOp::Not)
        } else if self.eat("-") {
            Some(UnaryOp::Neg)
        } else if self.eat("~") {
            Some(UnaryOp::BitNot)
        } else if self.eat("++") {
            Some(UnaryOp::Inc)
        } else if self.eat("--") {
            Some(UnaryOp::Dec)
        } else {
            None
        };
        match op {
            Some(op) => {
                let operand = self.parse_unary();
                let ty = match op {
                    UnaryOp::Not => SolType::Bool,
                    _ => operand.ty.clone(),
                };
                ExpressionIR::new(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    ty,
                )
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> ExpressionIR {
        let start = self.pos;
        let mut expr = self.parse_primary();
        loop {
            if self.eat(".") {
                expr = self.parse_member(expr);
            } else if self.is("(") {
                expr = self.parse_call(expr, start);
            } else if self.eat("[") {
                let index = self.parse_expression();
                self.expect("]");
                let ty = match &expr.ty {
                    SolType::Mapping(_, value) => value.as_ref().clone(),
                    SolType::Array(elem) => elem.as_ref().clone(),
                    SolType::Bytes => SolType::Uint(8),
                    _ => SolType::Unknown,
                };
                expr = ExpressionIR::new(
                    ExprKind::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    },
                    ty,
                );
            } else if self.eat("++") {
                expr = ExpressionIR::new(
                    ExprKind::Unary {
                        op: UnaryOp::Inc,
                        operand: Box::new(expr),
                    },
                    SolType::Unknown,
                );
            } else if self.eat("--") {
                expr = ExpressionIR::new(
                    ExprKind::Unary {
                        op: UnaryOp::Dec,
                        operand: Box::new(expr),
                    },
                    SolType::Unknown,
                );
            } else {
                break;
            }
        }
        expr
    }

    fn parse_member(&mut self, base: ExpressionIR) -> ExpressionIR {
        let member = match self.advance() {
            Some(token) => token.text,
            None => {
                self.diagnostics
                    .warning(self.line(), "dangling member access in expression");
                return base;
            }
        };

        // environment accessors
        if let ExprKind::Identifier(name) = &base.kind {
            match (name.as_str(), member.as_str()) {
                ("msg", "sender") => {
                    return ExpressionIR::new(ExprKind::EnvCaller, SolType::Address)
                }
                ("msg", "value") => return ExpressionIR::new(ExprKind::EnvValue, SolType::Uint(128)),
                ("block", "timestamp") => {
                    return ExpressionIR::new(ExprKind::EnvTimestamp, SolType::Uint(64))
                }
                ("block", "number") => {
                    return ExpressionIR::new(ExprKind::EnvBlockNumber, SolType::Uint(32))
                }
                _ => {}
            }
            // enum variant reference keeps its enum type
            if self.symbols.kind_of(name) == Some(SymbolKind::Enum) {
                let ty = SolType::Custom(name.clone());
                return ExpressionIR::new(
                    ExprKind::Member {
                        base: Box::new(base),
                        member,
                    },
                    ty,
                );
            }
        }

        if member == "length" && matches!(base.ty, SolType::Array(_) | SolType::Bytes | SolType::String)
        {
            return ExpressionIR::new(ExprKind::ArrayLength(Box::new(base)), SolType::Uint(256));
        }

        let ty = match &base.ty {
            SolType::Custom(name) => self
                .symbols
                .struct_field_type(name, &member)
                .cloned()
                .unwrap_or(SolType::Unknown),
            _ => SolType::Unknown,
        };
        if ty == SolType::Unknown {
            self.diagnostics.warning(
                self.line(),
                format!("unable to infer type of member access `.{}`", member),
            );
        }
        ExpressionIR::new(
            ExprKind::Member {
                base: Box::new(base),
                member,
            },
            ty,
        )
    }

    fn parse_call(&mut self, function: ExpressionIR, start: usize) -> ExpressionIR {
        // struct construction with named or positional arguments
        if let ExprKind::Identifier(name) = &function.kind {
            if self.symbols.kind_of(name) == Some(SymbolKind::Struct) {
                let name = name.clone();
                return self.parse_struct_init(function, &name);
            }
        }

        self.eat("(");
        let mut args = Vec::new();
        while !self.is(")") && self.peek().is_some() {
            args.push(self.parse_expression());
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")");

        // untranslatable builtins keep their original text as a placeholder
        if let ExprKind::Identifier(name) = &function.kind {
            let is_abi_like = name == "abi";
            if UNSUPPORTED_BUILTINS.contains(&name.as_str()) || is_abi_like {
                let raw = span_text(&self.tokens[start..self.pos]);
                self.diagnostics.warning(
                    self.line(),
                    format!("call to `{}` has no ink! equivalent", name),
                );
                return ExpressionIR::new(ExprKind::Unsupported(raw), SolType::Unknown);
            }
        }
        if let ExprKind::Member { base, .. } = &function.kind {
            if matches!(&base.kind, ExprKind::Identifier(n) if n == "abi") {
                let raw = span_text(&self.tokens[start..self.pos]);
                self.diagnostics
                    .warning(self.line(), "`abi` encoding has no ink! equivalent");
                return ExpressionIR::new(ExprKind::Unsupported(raw), SolType::Unknown);
            }
        }

        let ty = match &function.kind {
            ExprKind::Identifier(name) => self
                .symbols
                .function_returns(name)
                .and_then(|returns| returns.first())
                .cloned()
                .unwrap_or(SolType::Unknown),
            _ => SolType::Unknown,
        };
        ExpressionIR::new(
            ExprKind::Call {
                function: Box::new(function),
                args,
            },
            ty,
        )
    }

    /// `S(1, 2)` or `S({a: 1, b: 2})`; named arguments are reordered into
    /// field declaration order.
    fn parse_struct_init(&mut self, function: ExpressionIR, name: &str) -> ExpressionIR {
        self.eat("(");
        let mut args = Vec::new();
        if self.eat("{") {
            let mut named: Vec<(String, ExpressionIR)> = Vec::new();
            while !self.is("}") && self.peek().is_some() {
                let field = self.advance().map(|t| t.text).unwrap_or_default();
                self.expect(":");
                named.push((field, self.parse_expression()));
                if !self.eat(",") {
                    break;
                }
            }
            self.expect("}");
            if let Some(fields) = self.symbols.struct_fields(name) {
                let order: Vec<String> = fields.iter().map(|(n, _)| n.clone()).collect();
                for field in &order {
                    if let Some(idx) = named.iter().position(|(n, _)| n == field) {
                        args.push(named.remove(idx).1);
                    }
                }
            }
            // anything left over was not a declared field; keep it anyway
            for (_, value) in named {
                args.push(value);
            }
        } else {
            while !self.is(")") && self.peek().is_some() {
                args.push(self.parse_expression());
                if !self.eat(",") {
                    break;
                }
            }
        }
        self.expect(")");
        ExpressionIR::new(
            ExprKind::Call {
                function: Box::new(function),
                args,
            },
            SolType::Custom(name.to_owned()),
        )
    }

    fn parse_primary(&mut self) -> ExpressionIR {
        let token = match self.advance() {
            Some(token) => token,
            None => {
                self.diagnostics
                    .warning(self.line(), "expected an expression");
                return ExpressionIR::new(ExprKind::Unsupported(String::new()), SolType::Unknown);
            }
        };

        match token.kind {
            TokenKind::Number => {
                ExpressionIR::new(ExprKind::NumberLiteral(token.text), SolType::Uint(256))
            }
            TokenKind::HexNumber => {
                ExpressionIR::new(ExprKind::HexLiteral(token.text), SolType::Uint(256))
            }
            TokenKind::StringLiteral => {
                ExpressionIR::new(ExprKind::StringLiteral(token.text), SolType::String)
            }
            TokenKind::Keyword => self.parse_keyword_primary(token),
            TokenKind::Identifier => self.parse_identifier_primary(token),
            TokenKind::Punctuation if token.text == "(" => {
                let first = self.parse_expression();
                if self.eat(",") {
                    let mut items = vec![first];
                    while !self.is(")") && self.peek().is_some() {
                        items.push(self.parse_expression());
                        if !self.eat(",") {
                            break;
                        }
                    }
                    self.expect(")");
                    return ExpressionIR::new(ExprKind::Tuple(items), SolType::Unknown);
                }
                self.expect(")");
                first
            }
            _ => {
                self.diagnostics.warning(
                    token.line,
                    format!("unexpected token `{}` in expression", token.text),
                );
                ExpressionIR::new(ExprKind::Unsupported(token.text), SolType::Unknown)
            }
        }
    }

    fn parse_keyword_primary(&mut self, token: Token) -> ExpressionIR {
        match token.text.as_str() {
            "true" => ExpressionIR::new(ExprKind::BoolLiteral(true), SolType::Bool),
            "false" => ExpressionIR::new(ExprKind::BoolLiteral(false), SolType::Bool),
            "this" => ExpressionIR::new(ExprKind::EnvThis, SolType::Address),
            "type" => self.parse_type_limit(token),
            "payable" => {
                // payable(x) is a plain address cast on the ink! side
                if self.eat("(") {
                    let value = self.parse_expression();
                    self.expect(")");
                    if matches!(value.kind, ExprKind::NumberLiteral(ref n) if n == "0") {
                        return ExpressionIR::new(ExprKind::ZeroAddress, SolType::Address);
                    }
                    return ExpressionIR::new(
                        ExprKind::Cast {
                            ty: SolType::AddressPayable,
                            value: Box::new(value),
                        },
                        SolType::AddressPayable,
                    );
                }
                ExpressionIR::new(ExprKind::Unsupported(token.text), SolType::Unknown)
            }
            "new" => {
                let target = self.advance().map(|t| t.text).unwrap_or_default();
                self.diagnostics.warning(
                    token.line,
                    format!("`new {}` allocation has no mechanical translation", target),
                );
                ExpressionIR::new(
                    ExprKind::Unsupported(format!("new {}", target)),
                    SolType::Unknown,
                )
            }
            _ => {
                self.diagnostics.warning(
                    token.line,
                    format!("unexpected keyword `{}` in expression", token.text),
                );
                ExpressionIR::new(ExprKind::Unsupported(token.text), SolType::Unknown)
            }
        }
    }

    /// `type(T).max` / `type(T).min`. Anything else after `type` degrades.
    fn parse_type_limit(&mut self, token: Token) -> ExpressionIR {
        let well_formed = self.eat("(");
        let ty = self
            .advance()
            .and_then(|t| converter::elementary_type(&t.text));
        let closed = self.eat(")");
        if let (true, Some(ty), true) = (well_formed, ty, closed) {
            if self.eat(".") {
                if self.eat("max") {
                    return ExpressionIR::new(
                        ExprKind::Limit {
                            ty: ty.clone(),
                            max: true,
                        },
                        ty,
                    );
                }
                if self.eat("min") {
                    return ExpressionIR::new(
                        ExprKind::Limit {
                            ty: ty.clone(),
                            max: false,
                        },
                        ty,
                    );
                }
            }
        }
        self.diagnostics.warning(
            token.line,
            "unsupported `type(..)` expression, only `.max`/`.min` translate",
        );
        ExpressionIR::new(ExprKind::Unsupported(String::from("type(..)")), SolType::Unknown)
    }

    fn parse_identifier_primary(&mut self, token: Token) -> ExpressionIR {
        // elementary-type casts, including the zero-address idiom
        if let Some(ty) = converter::elementary_type(&token.text) {
            if self.eat("(") {
                let value = self.parse_expression();
                self.expect(")");
                if ty == SolType::Address {
                    if matches!(value.kind, ExprKind::EnvThis) {
                        return ExpressionIR::new(ExprKind::EnvThis, SolType::Address);
                    }
                    if matches!(value.kind, ExprKind::NumberLiteral(ref n) if n == "0") {
                        return ExpressionIR::new(ExprKind::ZeroAddress, SolType::Address);
                    }
                }
                return ExpressionIR::new(
                    ExprKind::Cast {
                        ty: ty.clone(),
                        value: Box::new(value),
                    },
                    ty,
                );
            }
        }

        let name = token.text;
        // magic namespaces resolve through member access, not the table
        if matches!(name.as_str(), "msg" | "block" | "tx" | "abi") {
            return ExpressionIR::new(ExprKind::Identifier(name), SolType::Unknown);
        }

        match self.symbols.resolve(&name) {
            Some(entry) => {
                let ty = match entry.kind {
                    SymbolKind::Enum => SolType::Custom(name.clone()),
                    SymbolKind::Function => SolType::Unknown,
                    _ => entry.ty.clone(),
                };
                ExpressionIR::new(ExprKind::Identifier(name), ty)
            }
            None => {
                self.diagnostics.warning(
                    token.line,
                    format!("unable to infer type of `{}`", name),
                );
                ExpressionIR::new(ExprKind::Identifier(name), SolType::Unknown)
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, left: ExpressionIR, right: ExpressionIR) -> ExpressionIR {
        let ty = if op.is_comparison() || op.is_logical() {
            SolType::Bool
        } else {
            self.arithmetic_type(&left, &right)
        };
        ExpressionIR::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
        )
    }

    /// Number literals adapt to the other operand's type; otherwise the
    /// wider width wins. Any `Unknown` operand poisons the result and the
    /// type-driven rewrites downstream are skipped.
    fn arithmetic_type(&self, left: &ExpressionIR, right: &ExpressionIR) -> SolType {
        let left_literal = matches!(left.kind, ExprKind::NumberLiteral(_) | ExprKind::HexLiteral(_));
        let right_literal =
            matches!(right.kind, ExprKind::NumberLiteral(_) | ExprKind::HexLiteral(_));
        if left_literal && right.ty.is_integer() {
            return right.ty.clone();
        }
        if right_literal && left.ty.is_integer() {
            return left.ty.clone();
        }
        wider(&left.ty, &right.ty)
    }
}

fn wider(a: &SolType, b: &SolType) -> SolType {
    match (a, b) {
        (SolType::Uint(x), SolType::Uint(y)) => SolType::Uint(*x.max(y)),
        (SolType::Int(x), SolType::Int(y)) => SolType::Int(*x.max(y)),
        (SolType::Uint(x), SolType::Int(y)) | (SolType::Int(x), SolType::Uint(y)) => {
            SolType::Int(*x.max(y))
        }
        _ if a == b => a.clone(),
        _ => SolType::Unknown,
    }
}
