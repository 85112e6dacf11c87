//! Declaration parser and pipeline front end.
//!
//! Consumes the token stream up to the first contract-or-interface
//! definition (everything before it is skipped, except doc comments
//! immediately above the definition), then parses the members in two
//! passes: signatures first so the symbol table is complete, bodies
//! second so forward references resolve regardless of declaration order.
//!
//! The single fatal condition of the whole pipeline lives here: a source
//! file without any contract or interface definition aborts with
//! `ParseError::MissingDefinition`. Every other anomaly degrades to a
//! diagnostic plus a placeholder in the IR.

pub mod expressions;
pub mod scanner;
pub mod statements;
pub mod symbols;

use crate::diagnostics::Diagnostics;
use crate::transpiler::ast::*;
use crate::transpiler::converter;
use log::{debug, info};
use scanner::{span_text, Token, TokenKind};
use symbols::{SymbolEntry, SymbolKind, SymbolTable};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no contract or interface definition found in source")]
    MissingDefinition,
}

/// Parses one Solidity source file into a contract unit plus the symbol
/// table the assembler queries. The diagnostics collector accumulates
/// every non-fatal anomaly encountered on the way.
pub fn parse(
    source: &str,
    diagnostics: &mut Diagnostics,
) -> Result<(ContractUnit, SymbolTable), ParseError> {
    let tokens = scanner::tokenize(source);
    let mut parser = DeclParser {
        tokens,
        pos: 0,
        symbols: SymbolTable::new(),
        pending_bodies: Vec::new(),
        pending_inits: Vec::new(),
    };
    parser.parse_unit(diagnostics)
}

/// Where a deferred token span belongs once the signature pass is done.
enum BodySlot {
    Constructor,
    Function(usize),
    Modifier(usize),
}

struct DeclParser {
    tokens: Vec<Token>,
    pos: usize,
    symbols: SymbolTable,
    pending_bodies: Vec<(BodySlot, std::ops::Range<usize>)>,
    pending_inits: Vec<(usize, std::ops::Range<usize>)>,
}

impl DeclParser {
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

    fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn matching(&self, open_idx: usize, open: &str, close: &str) -> usize {
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
        self.tokens.len()
    }

    fn skip_until(&mut self, text: &str) {
        while let Some(token) = self.advance() {
            if token.is(text) {
                break;
            }
        }
    }

    fn parse_unit(
        &mut self,
        diagnostics: &mut Diagnostics,
    ) -> Result<(ContractUnit, SymbolTable), ParseError> {
        let (kind, name, comments) = self.find_definition(diagnostics)?;
        info!("translating {} {}",
            match kind {
                ContractKind::Contract => "contract",
                ContractKind::Interface => "interface",
            },
            name
        );
        let mut unit = ContractUnit::new(kind, name, comments);

        // inheritance is tokenized and discarded, not resolved
        if self.eat("is") {
            let mut bases = Vec::new();
            let line = self.line();
            while !self.is("{") && self.peek().is_some() {
                if let Some(token) = self.advance() {
                    if token.kind == TokenKind::Identifier {
                        bases.push(token.text);
                    }
                }
            }
            diagnostics.info(
                line,
                format!(
                    "inheritance from `{}` is not resolved; base members must be merged manually",
                    bases.join("`, `")
                ),
            );
        }

        if !self.eat("{") {
            diagnostics.warning(self.line(), "expected `{` after definition header");
        }
        let body_close = self.matching(self.pos.saturating_sub(1), "{", "}");

        // pass 1: signatures and member shapes
        let mut pending_comments: Vec<String> = Vec::new();
        while self.pos < body_close.min(self.tokens.len()) {
            let token = match self.tokens.get(self.pos) {
                Some(token) => token.clone(),
                None => break,
            };
            if token.kind == TokenKind::DocComment {
                pending_comments.push(token.text);
                self.pos += 1;
                continue;
            }
            if token.is_comment() {
                self.pos += 1;
                continue;
            }
            let comments = std::mem::take(&mut pending_comments);
            self.parse_member(&mut unit, comments, diagnostics);
        }
        self.pos = (body_close + 1).min(self.tokens.len());

        if self.tokens[self.pos..]
            .iter()
            .any(|t| t.is("contract") || t.is("interface"))
        {
            diagnostics.info(
                self.line(),
                "only the first definition in a file is translated",
            );
        }

        // pass 2: initializers and bodies, now that the table is complete
        for (field_idx, range) in std::mem::take(&mut self.pending_inits) {
            let mut value =
                expressions::parse(&self.tokens[range], &self.symbols, diagnostics);
            value.mark_clone();
            unit.fields[field_idx].initial = Some(value);
        }
        for (slot, range) in std::mem::take(&mut self.pending_bodies) {
            let params: Vec<Param> = match &slot {
                BodySlot::Constructor => {
                    unit.constructor.as_ref().map(|f| f.params.clone()).unwrap_or_default()
                }
                BodySlot::Function(idx) => unit.functions[*idx].params.clone(),
                BodySlot::Modifier(idx) => unit.modifiers[*idx].params.clone(),
            };
            let named_returns: Vec<Param> = match &slot {
                BodySlot::Function(idx) => unit.functions[*idx]
                    .returns
                    .iter()
                    .filter(|p| !p.name.is_empty())
                    .cloned()
                    .collect(),
                _ => Vec::new(),
            };
            self.symbols.enter_scope();
            for param in params.iter().chain(named_returns.iter()) {
                self.symbols.declare(SymbolEntry {
                    name: param.name.clone(),
                    ty: param.ty.clone(),
                    kind: SymbolKind::Param,
                    visibility: Visibility::Private,
                });
            }
            let body =
                statements::parse_body(&self.tokens[range], &mut self.symbols, diagnostics);
            self.symbols.exit_scope();
            match slot {
                BodySlot::Constructor => {
                    if let Some(constructor) = unit.constructor.as_mut() {
                        constructor.body = body;
                    }
                }
                BodySlot::Function(idx) => unit.functions[idx].body = body,
                BodySlot::Modifier(idx) => unit.modifiers[idx].body = body,
            }
        }

        Ok((unit, std::mem::take(&mut self.symbols)))
    }

    /// Scans forward to the first contract or interface keyword. Doc
    /// comments immediately above it are retained for re-emission;
    /// pragma and import statements are skipped.
    fn find_definition(
        &mut self,
        diagnostics: &mut Diagnostics,
    ) -> Result<(ContractKind, String, Vec<String>), ParseError> {
        let mut comments: Vec<String> = Vec::new();
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            if token.kind == TokenKind::DocComment {
                comments.push(token.text);
                self.pos += 1;
                continue;
            }
            if token.is_comment() {
                self.pos += 1;
                continue;
            }
            match token.text.as_str() {
                "pragma" | "import" => {
                    self.skip_until(";");
                    comments.clear();
                }
                "abstract" => {
                    self.pos += 1;
                }
                "contract" | "interface" => {
                    let kind = if token.text == "contract" {
                        ContractKind::Contract
                    } else {
                        ContractKind::Interface
                    };
                    self.pos += 1;
                    let name = match self.advance() {
                        Some(t) if t.kind == TokenKind::Identifier => t.text,
                        _ => {
                            diagnostics.warning(token.line, "definition is missing a name");
                            String::from("Unnamed")
                        }
                    };
                    return Ok((kind, name, comments));
                }
                "library" => {
                    diagnostics.warning(
                        token.line,
                        "library definitions are not translated, skipping",
                    );
                    self.pos += 1;
                    if let Some(offset) =
                        self.tokens[self.pos..].iter().position(|t| t.is("{"))
                    {
                        let close = self.matching(self.pos + offset, "{", "}");
                        self.pos = (close + 1).min(self.tokens.len());
                    } else {
                        self.pos = self.tokens.len();
                    }
                    comments.clear();
                }
                _ => {
                    self.pos += 1;
                    comments.clear();
                }
            }
        }
        Err(ParseError::MissingDefinition)
    }

    fn parse_member(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        let token = match self.peek() {
            Some(token) => token.clone(),
            None => return,
        };
        if token.is(";") {
            self.advance();
            return;
        }
        match token.text.as_str() {
            "struct" => self.parse_struct(unit, comments, diagnostics),
            "enum" => self.parse_enum(unit, comments, diagnostics),
            "event" => self.parse_event(unit, comments, diagnostics),
            "modifier" => self.parse_modifier(unit, comments, diagnostics),
            "constructor" => self.parse_function(unit, comments, diagnostics, FunctionForm::Constructor),
            "function" => self.parse_function(unit, comments, diagnostics, FunctionForm::Named),
            "receive" | "fallback" => {
                self.parse_function(unit, comments, diagnostics, FunctionForm::Bare(token.text))
            }
            "using" => {
                diagnostics.info(
                    token.line,
                    "`using .. for ..` directives are not translated",
                );
                self.skip_until(";");
            }
            _ => self.parse_state_variable(unit, comments, diagnostics),
        }
    }

    fn parse_struct(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        self.advance(); // `struct`
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text,
            _ => {
                diagnostics.warning(self.line(), "struct is missing a name, skipping");
                self.skip_until("}");
                return;
            }
        };
        debug!("struct {}", name);
        let mut fields = Vec::new();
        self.eat("{");
        while !self.is("}") && self.peek().is_some() {
            let ty = match self.parse_type(diagnostics) {
                Some(ty) => ty,
                None => {
                    self.skip_until(";");
                    continue;
                }
            };
            let field_name = self.advance().map(|t| t.text).unwrap_or_default();
            self.eat(";");
            fields.push(Param { name: field_name, ty });
        }
        self.eat("}");
        self.symbols.record_struct(
            &name,
            fields.iter().map(|f| (f.name.clone(), f.ty.clone())).collect(),
        );
        self.symbols.declare(SymbolEntry {
            name: name.clone(),
            ty: SolType::Custom(name.clone()),
            kind: SymbolKind::Struct,
            visibility: Visibility::Public,
        });
        unit.structs.push(StructDef { name, fields, comments });
    }

    fn parse_enum(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        self.advance(); // `enum`
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text,
            _ => {
                diagnostics.warning(self.line(), "enum is missing a name, skipping");
                self.skip_until("}");
                return;
            }
        };
        debug!("enum {}", name);
        let mut variants = Vec::new();
        self.eat("{");
        while !self.is("}") && self.peek().is_some() {
            if let Some(token) = self.advance() {
                if token.kind == TokenKind::Identifier {
                    variants.push(token.text);
                }
            }
            self.eat(",");
        }
        self.eat("}");
        self.symbols.record_enum(&name, variants.clone());
        self.symbols.declare(SymbolEntry {
            name: name.clone(),
            ty: SolType::Custom(name.clone()),
            kind: SymbolKind::Enum,
            visibility: Visibility::Public,
        });
        unit.enums.push(EnumDef { name, variants, comments });
    }

    fn parse_event(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        self.advance(); // `event`
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text,
            _ => {
                diagnostics.warning(self.line(), "event is missing a name, skipping");
                self.skip_until(";");
                return;
            }
        };
        debug!("event {}", name);
        let mut fields = Vec::new();
        if self.eat("(") {
            while !self.is(")") && self.peek().is_some() {
                let ty = match self.parse_type(diagnostics) {
                    Some(ty) => ty,
                    None => break,
                };
                let indexed = self.eat("indexed");
                let field_name = match self.peek() {
                    Some(t) if t.kind == TokenKind::Identifier => {
                        let text = t.text.clone();
                        self.advance();
                        text
                    }
                    _ => format!("field_{}", fields.len()),
                };
                fields.push(EventField {
                    name: field_name,
                    ty,
                    indexed,
                });
                if !self.eat(",") {
                    break;
                }
            }
            self.eat(")");
        }
        self.eat("anonymous");
        self.eat(";");
        self.symbols.record_event(
            &name,
            fields.iter().map(|f| (f.name.clone(), f.ty.clone())).collect(),
        );
        self.symbols.declare(SymbolEntry {
            name: name.clone(),
            ty: SolType::Custom(name.clone()),
            kind: SymbolKind::Event,
            visibility: Visibility::Public,
        });
        unit.events.push(EventDef { name, fields, comments });
    }

    fn parse_modifier(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        self.advance(); // `modifier`
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text,
            _ => {
                diagnostics.warning(self.line(), "modifier is missing a name, skipping");
                self.skip_until("}");
                return;
            }
        };
        debug!("modifier {}", name);
        let params = if self.is("(") {
            self.parse_params(diagnostics)
        } else {
            Vec::new()
        };
        self.symbols.declare(SymbolEntry {
            name: name.clone(),
            ty: SolType::Unknown,
            kind: SymbolKind::Modifier,
            visibility: Visibility::Internal,
        });
        let body_range = self.capture_body();
        let idx = unit.modifiers.len();
        unit.modifiers.push(ModifierDef {
            name,
            params,
            body: Vec::new(),
            comments,
        });
        if let Some(range) = body_range {
            self.pending_bodies.push((BodySlot::Modifier(idx), range));
        }
    }

    fn parse_function(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
        form: FunctionForm,
    ) {
        let line = self.line();
        self.advance(); // `function` / `constructor` / `receive` / `fallback`
        let name = match &form {
            FunctionForm::Constructor => String::from("constructor"),
            FunctionForm::Bare(name) => name.clone(),
            FunctionForm::Named => match self.advance() {
                Some(t) if t.kind == TokenKind::Identifier => t.text,
                _ => {
                    diagnostics.warning(line, "function is missing a name, skipping");
                    self.skip_until(";");
                    return;
                }
            },
        };
        debug!("function {}", name);
        let params = self.parse_params(diagnostics);

        let mut visibility = Visibility::Public;
        let mut mutability = Mutability::Nonpayable;
        let mut modifiers: Vec<String> = Vec::new();
        let mut returns: Vec<Param> = Vec::new();
        loop {
            let token = match self.peek() {
                Some(token) => token.clone(),
                None => break,
            };
            if token.is("{") || token.is(";") {
                break;
            }
            match token.text.as_str() {
                "public" => {
                    visibility = Visibility::Public;
                    self.advance();
                }
                "external" => {
                    visibility = Visibility::External;
                    self.advance();
                }
                "internal" => {
                    visibility = Visibility::Internal;
                    self.advance();
                }
                "private" => {
                    visibility = Visibility::Private;
                    self.advance();
                }
                "view" => {
                    mutability = Mutability::View;
                    self.advance();
                }
                "pure" => {
                    mutability = Mutability::Pure;
                    self.advance();
                }
                "payable" => {
                    mutability = Mutability::Payable;
                    self.advance();
                }
                "virtual" => {
                    self.advance();
                }
                "override" => {
                    self.advance();
                    if self.is("(") {
                        let open = self.pos
                            + self.tokens[self.pos..]
                                .iter()
                                .position(|t| t.is("("))
                                .unwrap_or(0);
                        let close = self.matching(open, "(", ")");
                        self.pos = (close + 1).min(self.tokens.len());
                    }
                }
                "returns" => {
                    self.advance();
                    returns = self.parse_params(diagnostics);
                }
                _ => {
                    // a modifier invocation, kept as raw text
                    let start = self.pos;
                    self.advance();
                    if self.is("(") {
                        let open = self.pos
                            + self.tokens[self.pos..]
                                .iter()
                                .position(|t| t.is("("))
                                .unwrap_or(0);
                        let close = self.matching(open, "(", ")");
                        self.pos = (close + 1).min(self.tokens.len());
                    }
                    modifiers.push(span_text(&self.tokens[start..self.pos]));
                }
            }
        }

        let body_range = self.capture_body();
        let function = FunctionIR {
            name: name.clone(),
            params,
            returns,
            visibility,
            mutability,
            modifiers,
            body: Vec::new(),
            comments,
            line,
        };

        match form {
            FunctionForm::Constructor => {
                self.symbols.record_function_returns("constructor", Vec::new());
                unit.constructor = Some(function);
                if let Some(range) = body_range {
                    self.pending_bodies.push((BodySlot::Constructor, range));
                }
            }
            _ => {
                self.symbols.declare(SymbolEntry {
                    name: name.clone(),
                    ty: function
                        .returns
                        .first()
                        .map(|p| p.ty.clone())
                        .unwrap_or(SolType::Unknown),
                    kind: SymbolKind::Function,
                    visibility,
                });
                self.symbols.record_function_returns(
                    &name,
                    function.returns.iter().map(|p| p.ty.clone()).collect(),
                );
                let idx = unit.functions.len();
                unit.functions.push(function);
                if let Some(range) = body_range {
                    self.pending_bodies.push((BodySlot::Function(idx), range));
                }
            }
        }
    }

    /// Captures `{ .. }` as a token range for the second pass, or eats
    /// the `;` of a body-less declaration.
    fn capture_body(&mut self) -> Option<std::ops::Range<usize>> {
        if self.eat(";") {
            return None;
        }
        if !self.is("{") {
            return None;
        }
        let open = self.pos
            + self.tokens[self.pos..]
                .iter()
                .position(|t| t.is("{"))
                .unwrap_or(0);
        let close = self.matching(open, "{", "}");
        self.pos = (close + 1).min(self.tokens.len());
        Some(open + 1..close)
    }

    fn parse_params(&mut self, diagnostics: &mut Diagnostics) -> Vec<Param> {
        let mut params = Vec::new();
        if !self.eat("(") {
            return params;
        }
        while !self.is(")") && self.peek().is_some() {
            let ty = match self.parse_type(diagnostics) {
                Some(ty) => ty,
                None => {
                    // drop tokens to the next separator and move on
                    while !self.is(",") && !self.is(")") && self.peek().is_some() {
                        self.advance();
                    }
                    self.eat(",");
                    continue;
                }
            };
            while matches!(
                self.peek().map(|t| t.text.as_str()),
                Some("memory") | Some("storage") | Some("calldata") | Some("indexed")
            ) {
                self.advance();
            }
            let name = match self.peek() {
                Some(t) if t.kind == TokenKind::Identifier => {
                    let text = t.text.clone();
                    self.advance();
                    text
                }
                _ => String::new(),
            };
            params.push(Param { name, ty });
            if !self.eat(",") {
                break;
            }
        }
        self.eat(")");
        params
    }

    /// Parses a type at the cursor: `mapping(K => V)`, an elementary
    /// type, or a user-defined name, with any number of array suffixes.
    fn parse_type(&mut self, diagnostics: &mut Diagnostics) -> Option<SolType> {
        let token = self.peek()?.clone();
        let mut ty = if token.is("mapping") {
            self.advance();
            self.eat("(");
            let key = self.parse_type(diagnostics)?;
            if !self.eat("=>") {
                diagnostics.warning(token.line, "malformed mapping type");
            }
            let value = self.parse_type(diagnostics)?;
            self.eat(")");
            SolType::Mapping(Box::new(key), Box::new(value))
        } else if let Some(elementary) = converter::elementary_type(&token.text) {
            self.advance();
            if elementary == SolType::Address && self.eat("payable") {
                SolType::AddressPayable
            } else {
                elementary
            }
        } else if token.kind == TokenKind::Identifier {
            self.advance();
            // member types like `OtherContract.Struct` keep the last segment
            let mut name = token.text;
            while self.eat(".") {
                if let Some(t) = self.advance() {
                    name = t.text;
                }
            }
            SolType::Custom(name)
        } else {
            return None;
        };
        while self.is("[") {
            self.advance();
            while !self.is("]") && self.peek().is_some() {
                self.advance();
            }
            if !self.eat("]") {
                break;
            }
            ty = SolType::Array(Box::new(ty));
        }
        Some(ty)
    }

    fn parse_state_variable(
        &mut self,
        unit: &mut ContractUnit,
        comments: Vec<String>,
        diagnostics: &mut Diagnostics,
    ) {
        let line = self.line();
        let start = self.pos;
        let ty = match self.parse_type(diagnostics) {
            Some(ty) => ty,
            None => {
                self.unsupported_member(unit, start, line, diagnostics);
                return;
            }
        };
        let mut visibility = Visibility::Internal;
        let mut constant = false;
        loop {
            match self.peek().map(|t| t.text.clone()).as_deref() {
                Some("public") => {
                    visibility = Visibility::Public;
                    self.advance();
                }
                Some("private") => {
                    visibility = Visibility::Private;
                    self.advance();
                }
                Some("internal") => {
                    visibility = Visibility::Internal;
                    self.advance();
                }
                Some("constant") | Some("immutable") => {
                    constant = true;
                    self.advance();
                }
                Some("override") => {
                    self.advance();
                }
                _ => break,
            }
        }
        let name = match self.peek() {
            Some(t) if t.kind == TokenKind::Identifier => {
                let text = t.text.clone();
                self.advance();
                text
            }
            _ => {
                self.unsupported_member(unit, start, line, diagnostics);
                return;
            }
        };
        debug!("state variable {}", name);
        let init_range = if self.eat("=") {
            let init_start = self.pos;
            let mut depth = 0i32;
            while self.pos < self.tokens.len() {
                let t = &self.tokens[self.pos];
                if t.is("(") || t.is("[") || t.is("{") {
                    depth += 1;
                } else if t.is(")") || t.is("]") || t.is("}") {
                    depth -= 1;
                } else if t.is(";") && depth == 0 {
                    break;
                }
                self.pos += 1;
            }
            Some(init_start..self.pos)
        } else {
            None
        };
        self.eat(";");

        self.symbols.declare(SymbolEntry {
            name: name.clone(),
            ty: ty.clone(),
            kind: if constant {
                SymbolKind::Constant
            } else {
                SymbolKind::StateVar
            },
            visibility,
        });
        let field_idx = unit.fields.len();
        unit.fields.push(ContractField {
            name,
            ty,
            visibility,
            constant,
            initial: None,
            comments,
            line,
        });
        if let Some(range) = init_range {
            self.pending_inits.push((field_idx, range));
        }
    }

    /// Degrades an unclassifiable member to a marker: skip to the end of
    /// the declaration (past a balanced block if one opens first) and
    /// keep the original text.
    fn unsupported_member(
        &mut self,
        unit: &mut ContractUnit,
        start: usize,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        let mut depth = 0i32;
        while self.pos < self.tokens.len() {
            let token = &self.tokens[self.pos];
            if token.is("{") {
                depth += 1;
            } else if token.is("}") {
                depth -= 1;
                if depth <= 0 {
                    self.pos += 1;
                    break;
                }
            } else if token.is(";") && depth == 0 {
                self.pos += 1;
                break;
            }
            self.pos += 1;
        }
        let raw = span_text(&self.tokens[start..self.pos.min(self.tokens.len())]);
        diagnostics.warning(
            line,
            format!("unsupported contract member `{}` left as a marker", raw),
        );
        unit.unsupported.push(raw);
    }
}

enum FunctionForm {
    Named,
    Constructor,
    Bare(String),
}
