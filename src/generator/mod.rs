//! Assembler: walks the parsed contract unit and emits the ink! source
//! text.
//!
//! The output follows a fixed block order: shared error type, events,
//! structs, enums, constants, storage container behind a stable storage
//! key, then an impl block with the constructor (always present, even if
//! synthesized) and the functions in declaration order. A single
//! unsupported member never fails the unit; it degrades to a review
//! marker carrying the original text.

use crate::diagnostics::Diagnostics;
use crate::parser::symbols::{SymbolKind, SymbolTable};
use crate::transpiler::ast::*;
use crate::transpiler::converter;
use log::debug;
use std::collections::BTreeSet;

const UNCHECKED_OPEN: &str = "// Please handle unchecked blocks manually >>>";
const UNCHECKED_CLOSE: &str = "// <<< Please handle unchecked blocks manually";
const UNSUPPORTED_MARKER: &str = "// Please translate the following statement manually >>>";
const MEMBER_MARKER: &str = "// Please translate the following contract member manually >>>";

/// Emits the destination source text for one fully parsed unit.
pub fn assemble(unit: &ContractUnit, symbols: &SymbolTable, diagnostics: &mut Diagnostics) -> String {
    let mut assembler = Assembler {
        symbols,
        diagnostics,
        imports: BTreeSet::new(),
    };
    match unit.kind {
        ContractKind::Contract => assembler.assemble_contract(unit),
        ContractKind::Interface => assembler.assemble_interface(unit),
    }
}

#[derive(Clone, Copy)]
struct EmitCtx {
    receiver: &'static str,
    in_constructor: bool,
    line: usize,
}

struct Assembler<'a> {
    symbols: &'a SymbolTable,
    diagnostics: &'a mut Diagnostics,
    imports: BTreeSet<String>,
}

fn push_line(out: &mut String, indent: usize, text: &str) {
    if text.is_empty() {
        out.push('\n');
        return;
    }
    for _ in 0..indent {
        out.push_str("    ");
    }
    out.push_str(text);
    out.push('\n');
}

fn push_doc(out: &mut String, indent: usize, comments: &[String]) {
    for comment in comments {
        for line in comment.split('\n') {
            push_line(out, indent, &format!("/// {}", line.trim()));
        }
    }
}

impl<'a> Assembler<'a> {
    fn assemble_contract(&mut self, unit: &ContractUnit) -> String {
        debug!("assembling contract {}", unit.name);
        let mut body = String::new();

        self.emit_error_enum(&mut body);
        self.emit_events(&mut body, unit);
        self.emit_structs(&mut body, unit);
        self.emit_enums(&mut body, unit);
        self.emit_constants(&mut body, unit);
        self.emit_storage(&mut body, unit);
        self.emit_impl(&mut body, unit);

        // the storage container derives need these regardless of content
        self.imports
            .insert(String::from("ink_storage::traits::SpreadAllocate"));
        self.imports.insert(String::from("openbrush::traits::Storage"));
        self.imports.insert(String::from("scale::{Decode, Encode}"));

        let mut out = String::new();
        push_line(&mut out, 0, "#![cfg_attr(not(feature = \"std\"), no_std)]");
        push_line(&mut out, 0, "#![feature(min_specialization)]");
        push_line(&mut out, 0, "");
        push_doc(&mut out, 0, &unit.comments);
        push_line(&mut out, 0, "#[openbrush::contract]");
        push_line(
            &mut out,
            0,
            &format!("pub mod {} {{", converter::module_name(&unit.name)),
        );
        for import in &self.imports {
            push_line(&mut out, 1, &format!("use {};", import));
        }
        push_line(&mut out, 0, "");
        out.push_str(&body);
        push_line(&mut out, 0, "}");
        out
    }

    fn assemble_interface(&mut self, unit: &ContractUnit) -> String {
        debug!("assembling interface {}", unit.name);
        let name = converter::trait_name(&unit.name);
        let mut out = String::new();
        push_doc(&mut out, 0, &unit.comments);
        self.emit_error_enum_at(&mut out, 0);
        for event in &unit.events {
            self.emit_event(&mut out, 0, event);
        }
        for def in &unit.structs {
            self.emit_struct(&mut out, 0, def);
        }
        for def in &unit.enums {
            self.emit_enum(&mut out, 0, def);
        }
        push_line(&mut out, 0, "#[openbrush::wrapper]");
        push_line(&mut out, 0, &format!("pub type {0}Ref = dyn {0};", name));
        push_line(&mut out, 0, "");
        push_line(&mut out, 0, "#[openbrush::trait_definition]");
        push_line(&mut out, 0, &format!("pub trait {} {{", name));
        for function in &unit.functions {
            push_doc(&mut out, 1, &function.comments);
            push_line(&mut out, 1, "#[ink(message)]");
            let receiver = if function.mutability.is_readonly() {
                "&self"
            } else {
                "&mut self"
            };
            push_line(
                &mut out,
                1,
                &format!(
                    "fn {}({}{}) -> {};",
                    converter::snake(&function.name),
                    receiver,
                    self.param_list(&function.params),
                    self.return_type(&function.returns),
                ),
            );
            push_line(&mut out, 0, "");
        }
        push_line(&mut out, 0, "}");
        out
    }

    fn emit_error_enum(&mut self, out: &mut String) {
        self.emit_error_enum_at(out, 1);
    }

    /// The uniform failure channel of every generated function.
    fn emit_error_enum_at(&mut self, out: &mut String, indent: usize) {
        self.imports
            .insert(String::from("ink_prelude::string::String"));
        push_line(out, indent, "#[derive(Debug, Encode, Decode, PartialEq)]");
        push_line(
            out,
            indent,
            "#[cfg_attr(feature = \"std\", derive(scale_info::TypeInfo))]",
        );
        push_line(out, indent, "pub enum Error {");
        push_line(out, indent + 1, "Custom(String),");
        push_line(out, indent, "}");
        push_line(out, 0, "");
    }

    fn emit_events(&mut self, out: &mut String, unit: &ContractUnit) {
        for event in &unit.events {
            self.emit_event(out, 1, event);
        }
    }

    fn emit_event(&mut self, out: &mut String, indent: usize, event: &EventDef) {
        push_doc(out, indent, &event.comments);
        push_line(out, indent, "#[ink(event)]");
        push_line(out, indent, &format!("pub struct {} {{", event.name));
        for field in &event.fields {
            if field.indexed {
                push_line(out, indent + 1, "#[ink(topic)]");
            }
            let ty = converter::convert_type(&field.ty, &mut self.imports);
            push_line(
                out,
                indent + 1,
                &format!("{}: {},", converter::snake(&field.name), ty),
            );
        }
        push_line(out, indent, "}");
        push_line(out, 0, "");
    }

    fn emit_structs(&mut self, out: &mut String, unit: &ContractUnit) {
        for def in &unit.structs {
            self.emit_struct(out, 1, def);
        }
    }

    fn emit_struct(&mut self, out: &mut String, indent: usize, def: &StructDef) {
        push_doc(out, indent, &def.comments);
        push_line(out, indent, "#[derive(Default, Encode, Decode)]");
        push_line(
            out,
            indent,
            "#[cfg_attr(feature = \"std\", derive(scale_info::TypeInfo))]",
        );
        push_line(out, indent, &format!("pub struct {} {{", def.name));
        for field in &def.fields {
            let ty = converter::convert_type(&field.ty, &mut self.imports);
            push_line(
                out,
                indent + 1,
                &format!("pub {}: {},", converter::snake(&field.name), ty),
            );
        }
        push_line(out, indent, "}");
        push_line(out, 0, "");
    }

    fn emit_enums(&mut self, out: &mut String, unit: &ContractUnit) {
        for def in &unit.enums {
            self.emit_enum(out, 1, def);
        }
    }

    fn emit_enum(&mut self, out: &mut String, indent: usize, def: &EnumDef) {
        push_doc(out, indent, &def.comments);
        push_line(out, indent, &format!("pub enum {} {{", def.name));
        for variant in &def.variants {
            push_line(out, indent + 1, &format!("{},", variant));
        }
        push_line(out, indent, "}");
        push_line(out, 0, "");
    }

    /// `constant` state variables become module-level consts; they hold
    /// no storage slot in the source language either.
    fn emit_constants(&mut self, out: &mut String, unit: &ContractUnit) {
        let mut any = false;
        for field in unit.fields.iter().filter(|f| f.constant) {
            push_doc(out, 1, &field.comments);
            let ty = converter::convert_type(&field.ty, &mut self.imports);
            let ctx = EmitCtx {
                receiver: "self",
                in_constructor: false,
                line: field.line,
            };
            let value = match &field.initial {
                Some(expr) => self.render(expr, ctx),
                None => String::from("Default::default()"),
            };
            push_line(
                out,
                1,
                &format!(
                    "pub const {}: {} = {};",
                    converter::screaming(&field.name),
                    ty,
                    value
                ),
            );
            any = true;
        }
        if any {
            push_line(out, 0, "");
        }
    }

    /// Storage container bound to a stable key, plus the outer contract
    /// type holding it as its sole storage field.
    fn emit_storage(&mut self, out: &mut String, unit: &ContractUnit) {
        push_line(
            out,
            1,
            "pub const STORAGE_KEY: u32 = openbrush::storage_unique_key!(Data);",
        );
        push_line(out, 0, "");
        push_line(out, 1, "#[derive(Default, Debug)]");
        push_line(out, 1, "#[openbrush::upgradeable_storage(STORAGE_KEY)]");
        push_line(out, 1, "pub struct Data {");
        for field in unit.fields.iter().filter(|f| !f.constant) {
            push_doc(out, 2, &field.comments);
            let ty = converter::convert_type(&field.ty, &mut self.imports);
            push_line(
                out,
                2,
                &format!("pub {}: {},", converter::snake(&field.name), ty),
            );
        }
        push_line(out, 1, "}");
        push_line(out, 0, "");
        push_line(out, 1, "#[ink(storage)]");
        push_line(out, 1, "#[derive(Default, SpreadAllocate, Storage)]");
        push_line(out, 1, &format!("pub struct {} {{", unit.name));
        push_line(out, 2, "#[storage_field]");
        push_line(out, 2, "data: Data,");
        push_line(out, 1, "}");
        push_line(out, 0, "");
    }

    fn emit_impl(&mut self, out: &mut String, unit: &ContractUnit) {
        push_line(out, 1, &format!("impl {} {{", unit.name));
        self.emit_constructor(out, unit);
        self.emit_getters(out, unit);
        for function in &unit.functions {
            self.emit_function(out, function);
        }
        for modifier in &unit.modifiers {
            self.emit_modifier(out, modifier);
        }
        for raw in &unit.unsupported {
            push_line(out, 2, MEMBER_MARKER);
            push_line(out, 2, &format!("// {}", raw));
            push_line(out, 0, "");
        }
        push_line(out, 1, "}");
    }

    /// Always exactly one constructor: the source one translated, or a
    /// synthesized empty one.
    fn emit_constructor(&mut self, out: &mut String, unit: &ContractUnit) {
        let ctx = EmitCtx {
            receiver: "instance",
            in_constructor: true,
            line: unit.constructor.as_ref().map(|c| c.line).unwrap_or(0),
        };
        match &unit.constructor {
            Some(constructor) => {
                push_doc(out, 2, &constructor.comments);
                push_line(out, 2, "#[ink(constructor)]");
                push_line(
                    out,
                    2,
                    &format!(
                        "pub fn new({}) -> Self {{",
                        self.param_list_bare(&constructor.params)
                    ),
                );
                push_line(
                    out,
                    3,
                    "ink_lang::codegen::initialize_contract(|instance: &mut Self| {",
                );
                for invocation in &constructor.modifiers {
                    push_line(
                        out,
                        4,
                        &format!("// Please handle modifier {} manually", invocation),
                    );
                }
                self.emit_statements(out, 4, &constructor.body, ctx);
                push_line(out, 3, "})");
                push_line(out, 2, "}");
                push_line(out, 0, "");
            }
            None => {
                push_line(out, 2, "#[ink(constructor)]");
                push_line(out, 2, "pub fn new() -> Self {");
                push_line(
                    out,
                    3,
                    "ink_lang::codegen::initialize_contract(|instance: &mut Self| {})",
                );
                push_line(out, 2, "}");
                push_line(out, 0, "");
            }
        }
    }

    /// Public state variables get a generated getter message, the way the
    /// source language exposes them.
    fn emit_getters(&mut self, out: &mut String, unit: &ContractUnit) {
        for field in unit
            .fields
            .iter()
            .filter(|f| !f.constant && f.visibility == Visibility::Public)
        {
            let name = converter::snake(&field.name);
            match &field.ty {
                SolType::Mapping(_, _) => {
                    // mapping getters take the key chain as arguments
                    let mut keys = Vec::new();
                    let mut inner = &field.ty;
                    while let SolType::Mapping(key, value) = inner {
                        keys.push(converter::convert_type(key, &mut self.imports));
                        inner = value.as_ref();
                    }
                    let value_ty = converter::convert_type(inner, &mut self.imports);
                    let params: Vec<String> = keys
                        .iter()
                        .enumerate()
                        .map(|(i, ty)| format!("key_{}: {}", i, ty))
                        .collect();
                    let key_expr = if keys.len() == 1 {
                        String::from("&key_0")
                    } else {
                        let names: Vec<String> =
                            (0..keys.len()).map(|i| format!("key_{}", i)).collect();
                        format!("&({})", names.join(", "))
                    };
                    push_line(out, 2, "#[ink(message)]");
                    push_line(
                        out,
                        2,
                        &format!(
                            "pub fn {}(&self, {}) -> Result<{}, Error> {{",
                            name,
                            params.join(", "),
                            value_ty
                        ),
                    );
                    push_line(
                        out,
                        3,
                        &format!(
                            "return Ok(self.data.{}.get({}).unwrap_or_default())",
                            name, key_expr
                        ),
                    );
                    push_line(out, 2, "}");
                    push_line(out, 0, "");
                }
                ty => {
                    let converted = converter::convert_type(ty, &mut self.imports);
                    let clone = if ty.is_reference() { ".clone()" } else { "" };
                    push_line(out, 2, "#[ink(message)]");
                    push_line(
                        out,
                        2,
                        &format!("pub fn {}(&self) -> Result<{}, Error> {{", name, converted),
                    );
                    push_line(out, 3, &format!("return Ok(self.data.{}{})", name, clone));
                    push_line(out, 2, "}");
                    push_line(out, 0, "");
                }
            }
        }
    }

    fn emit_function(&mut self, out: &mut String, function: &FunctionIR) {
        push_doc(out, 2, &function.comments);
        let name = converter::snake(&function.name);
        let ctx = EmitCtx {
            receiver: "self",
            in_constructor: false,
            line: function.line,
        };
        if function.visibility.is_message() {
            if function.mutability == Mutability::Payable {
                push_line(out, 2, "#[ink(message, payable)]");
            } else {
                push_line(out, 2, "#[ink(message)]");
            }
        }
        let receiver = if function.mutability.is_readonly() {
            "&self"
        } else {
            "&mut self"
        };
        let prefix = if function.visibility.is_message() {
            format!("pub fn {}", name)
        } else {
            format!("fn _{}", name)
        };
        push_line(
            out,
            2,
            &format!(
                "{}({}{}) -> {} {{",
                prefix,
                receiver,
                self.param_list(&function.params),
                self.return_type(&function.returns)
            ),
        );
        for invocation in &function.modifiers {
            push_line(
                out,
                3,
                &format!("// Please handle modifier {} manually", invocation),
            );
        }
        // named return values exist from the start of the body
        let named_returns: Vec<&Param> =
            function.returns.iter().filter(|p| !p.name.is_empty()).collect();
        if named_returns.len() == function.returns.len() && !named_returns.is_empty() {
            for param in &named_returns {
                let ty = converter::convert_type(&param.ty, &mut self.imports);
                push_line(
                    out,
                    3,
                    &format!(
                        "let mut {}: {} = Default::default();",
                        converter::snake(&param.name),
                        ty
                    ),
                );
            }
        }
        self.emit_statements(out, 3, &function.body, ctx);
        if !terminates(&function.body) {
            if function.returns.is_empty() {
                push_line(out, 3, "Ok(())");
            } else if named_returns.len() == function.returns.len() {
                let names: Vec<String> = named_returns
                    .iter()
                    .map(|p| converter::snake(&p.name))
                    .collect();
                if names.len() == 1 {
                    push_line(out, 3, &format!("return Ok({})", names[0]));
                } else {
                    push_line(out, 3, &format!("return Ok(({}))", names.join(", ")));
                }
            } else {
                push_line(out, 3, "todo!()");
            }
        }
        push_line(out, 2, "}");
        push_line(out, 0, "");
    }

    /// Modifier declarations become internal functions; the `_;`
    /// placeholder is kept as a marker for manual inlining.
    fn emit_modifier(&mut self, out: &mut String, modifier: &ModifierDef) {
        push_doc(out, 2, &modifier.comments);
        let ctx = EmitCtx {
            receiver: "self",
            in_constructor: false,
            line: 0,
        };
        push_line(
            out,
            2,
            &format!(
                "fn _{}(&mut self{}) -> Result<(), Error> {{",
                converter::snake(&modifier.name),
                self.param_list(&modifier.params)
            ),
        );
        self.emit_statements(out, 3, &modifier.body, ctx);
        if !terminates(&modifier.body) {
            push_line(out, 3, "Ok(())");
        }
        push_line(out, 2, "}");
        push_line(out, 0, "");
    }

    fn param_list(&mut self, params: &[Param]) -> String {
        let mut out = String::new();
        for (i, param) in params.iter().enumerate() {
            let name = if param.name.is_empty() {
                format!("param_{}", i)
            } else {
                converter::snake(&param.name)
            };
            let ty = converter::convert_type(&param.ty, &mut self.imports);
            out.push_str(&format!(", {}: {}", name, ty));
        }
        out
    }

    fn param_list_bare(&mut self, params: &[Param]) -> String {
        self.param_list(params)
            .strip_prefix(", ")
            .unwrap_or("")
            .to_owned()
    }

    fn return_type(&mut self, returns: &[Param]) -> String {
        match returns.len() {
            0 => String::from("Result<(), Error>"),
            1 => {
                let ty = converter::convert_type(&returns[0].ty, &mut self.imports);
                format!("Result<{}, Error>", ty)
            }
            _ => {
                let types: Vec<String> = returns
                    .iter()
                    .map(|p| converter::convert_type(&p.ty, &mut self.imports))
                    .collect();
                format!("Result<({}), Error>", types.join(", "))
            }
        }
    }

    fn emit_statements(
        &mut self,
        out: &mut String,
        indent: usize,
        statements: &[StatementIR],
        ctx: EmitCtx,
    ) {
        for statement in statements {
            self.emit_statement(out, indent, statement, ctx);
        }
    }

    fn emit_statement(
        &mut self,
        out: &mut String,
        indent: usize,
        statement: &StatementIR,
        ctx: EmitCtx,
    ) {
        match statement {
            StatementIR::Expression(expr) => {
                let text = self.render(expr, ctx);
                push_line(out, indent, &format!("{};", text));
            }
            StatementIR::Declaration { name, ty, value } => {
                let converted = converter::convert_type(ty, &mut self.imports);
                let value_text = match value {
                    Some(expr) => self.render_value(expr, ctx),
                    None => String::from("Default::default()"),
                };
                push_line(
                    out,
                    indent,
                    &format!(
                        "let {}: {} = {};",
                        converter::snake(name),
                        converted,
                        value_text
                    ),
                );
            }
            StatementIR::Assign { target, op, value } => {
                self.emit_assign(out, indent, target, *op, value, ctx);
            }
            StatementIR::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.render(condition, ctx);
                push_line(out, indent, &format!("if {} {{", cond));
                self.emit_statements(out, indent + 1, then_branch, ctx);
                self.emit_else(out, indent, else_branch.as_deref(), ctx);
            }
            StatementIR::While { condition, body } => {
                let cond = self.render(condition, ctx);
                push_line(out, indent, &format!("while {} {{", cond));
                self.emit_statements(out, indent + 1, body, ctx);
                push_line(out, indent, "}");
            }
            StatementIR::DoWhile { body, condition } => {
                push_line(out, indent, "loop {");
                self.emit_statements(out, indent + 1, body, ctx);
                let cond = self.render_negated(condition, ctx);
                push_line(out, indent + 1, &format!("if {} {{", cond));
                push_line(out, indent + 2, "break");
                push_line(out, indent + 1, "}");
                push_line(out, indent, "}");
            }
            StatementIR::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.emit_statement(out, indent, init, ctx);
                }
                match condition {
                    Some(condition) => {
                        let cond = self.render(condition, ctx);
                        push_line(out, indent, &format!("while {} {{", cond));
                    }
                    None => push_line(out, indent, "loop {"),
                }
                self.emit_statements(out, indent + 1, body, ctx);
                if let Some(update) = update {
                    self.emit_statement(out, indent + 1, update, ctx);
                }
                push_line(out, indent, "}");
            }
            StatementIR::Return(value) => {
                if ctx.in_constructor {
                    if value.is_some() {
                        self.diagnostics.info(
                            ctx.line,
                            "constructor return value dropped during translation",
                        );
                    }
                    push_line(out, indent, "return;");
                } else {
                    match value {
                        Some(expr) => {
                            let text = self.render_value(expr, ctx);
                            push_line(out, indent, &format!("return Ok({})", text));
                        }
                        None => push_line(out, indent, "return Ok(())"),
                    }
                }
            }
            StatementIR::Emit { event, args } => {
                self.emit_event_statement(out, indent, event, args, ctx);
            }
            StatementIR::Require { condition, message } => {
                let cond = self.render_negated(condition, ctx);
                let message = message.as_deref().unwrap_or("requirement failed");
                push_line(out, indent, &format!("if {} {{", cond));
                if ctx.in_constructor {
                    push_line(out, indent + 1, &format!("panic!(\"{}\")", message));
                } else {
                    push_line(
                        out,
                        indent + 1,
                        &format!("return Err(Error::Custom(String::from(\"{}\")))", message),
                    );
                }
                push_line(out, indent, "}");
            }
            StatementIR::Revert { message } => {
                let message = message.as_deref().unwrap_or("reverted");
                if ctx.in_constructor {
                    push_line(out, indent, &format!("panic!(\"{}\")", message));
                } else {
                    push_line(
                        out,
                        indent,
                        &format!("return Err(Error::Custom(String::from(\"{}\")))", message),
                    );
                }
            }
            StatementIR::Delete(target) => {
                self.emit_delete(out, indent, target, ctx);
            }
            StatementIR::Break => push_line(out, indent, "break;"),
            StatementIR::Continue => push_line(out, indent, "continue;"),
            StatementIR::Block(body) => {
                push_line(out, indent, "{");
                self.emit_statements(out, indent + 1, body, ctx);
                push_line(out, indent, "}");
            }
            StatementIR::Unchecked(body) => {
                push_line(out, indent, UNCHECKED_OPEN);
                self.emit_statements(out, indent, body, ctx);
                push_line(out, indent, UNCHECKED_CLOSE);
            }
            StatementIR::ModifierPlaceholder => {
                push_line(
                    out,
                    indent,
                    "// Please insert the body of the modified function here",
                );
            }
            StatementIR::Comment(text) => {
                push_line(out, indent, &format!("// {}", text));
            }
            StatementIR::Unsupported { raw, line } => {
                self.diagnostics.warning_with_marker(
                    *line,
                    "statement preserved as a comment, no translation emitted",
                    UNSUPPORTED_MARKER,
                );
                push_line(out, indent, UNSUPPORTED_MARKER);
                push_line(out, indent, &format!("// {}", raw));
            }
        }
    }

    fn emit_else(
        &mut self,
        out: &mut String,
        indent: usize,
        else_branch: Option<&[StatementIR]>,
        ctx: EmitCtx,
    ) {
        match else_branch {
            None => push_line(out, indent, "}"),
            Some([StatementIR::If {
                condition,
                then_branch,
                else_branch,
            }]) => {
                let cond = self.render(condition, ctx);
                push_line(out, indent, &format!("}} else if {} {{", cond));
                self.emit_statements(out, indent + 1, then_branch, ctx);
                self.emit_else(out, indent, else_branch.as_deref(), ctx);
            }
            Some(body) => {
                push_line(out, indent, "} else {");
                self.emit_statements(out, indent + 1, body, ctx);
                push_line(out, indent, "}");
            }
        }
    }

    /// Mapping writes go through `insert`; everything else is a plain
    /// assignment. Compound operators on mappings read-modify-write.
    fn emit_assign(
        &mut self,
        out: &mut String,
        indent: usize,
        target: &ExpressionIR,
        op: AssignOp,
        value: &ExpressionIR,
        ctx: EmitCtx,
    ) {
        if let Some((map, keys)) = self.mapping_access(target) {
            let map_text = self.render(map, ctx);
            let key_text = self.render_keys(&keys, ctx);
            let value_text = self.render_value(value, ctx);
            let stored = match op {
                AssignOp::Assign => value_text,
                _ => {
                    let read = format!("{}.get({}).unwrap_or_default()", map_text, key_text);
                    let operator = op.as_str().trim_end_matches('=');
                    format!("{} {} {}", read, operator, value_text)
                }
            };
            push_line(
                out,
                indent,
                &format!("{}.insert({}, &({}));", map_text, key_text, stored),
            );
            return;
        }
        let target_text = self.render(target, ctx);
        let value_text = self.render_value(value, ctx);
        push_line(
            out,
            indent,
            &format!("{} {} {};", target_text, op.as_str(), value_text),
        );
    }

    fn emit_delete(
        &mut self,
        out: &mut String,
        indent: usize,
        target: &ExpressionIR,
        ctx: EmitCtx,
    ) {
        if let Some((map, keys)) = self.mapping_access(target) {
            let map_text = self.render(map, ctx);
            let key_text = self.render_keys(&keys, ctx);
            push_line(out, indent, &format!("{}.remove({});", map_text, key_text));
            return;
        }
        let target_text = self.render(target, ctx);
        push_line(
            out,
            indent,
            &format!("{} = Default::default();", target_text),
        );
    }

    fn emit_event_statement(
        &mut self,
        out: &mut String,
        indent: usize,
        event: &str,
        args: &[ExpressionIR],
        ctx: EmitCtx,
    ) {
        let fields = self.symbols.event_fields(event).map(|f| f.to_vec());
        push_line(
            out,
            indent,
            &format!("{}.env().emit_event({} {{", ctx.receiver, event),
        );
        for (i, arg) in args.iter().enumerate() {
            let field_name = match &fields {
                Some(fields) if i < fields.len() => converter::snake(&fields[i].0),
                _ => format!("field_{}", i),
            };
            if fields.as_ref().map_or(true, |f| i >= f.len()) {
                self.diagnostics.warning(
                    ctx.line,
                    format!("emit of `{}` has more arguments than declared fields", event),
                );
            }
            let text = self.render(arg, ctx);
            push_line(out, indent + 1, &format!("{}: {},", field_name, text));
        }
        push_line(out, indent, "});");
    }

    /// Peels a (possibly nested) mapping index chain off an expression.
    /// Returns the mapping expression and the key chain in source order.
    fn mapping_access<'e>(
        &self,
        expr: &'e ExpressionIR,
    ) -> Option<(&'e ExpressionIR, Vec<&'e ExpressionIR>)> {
        let mut keys = Vec::new();
        let mut current = expr;
        while let ExprKind::Index { base, index } = &current.kind {
            keys.push(index.as_ref());
            current = base.as_ref();
        }
        if keys.is_empty() || !current.ty.is_mapping() {
            return None;
        }
        keys.reverse();
        Some((current, keys))
    }

    fn render_keys(&mut self, keys: &[&ExpressionIR], ctx: EmitCtx) -> String {
        if keys.len() == 1 {
            format!("&{}", self.render_atom(keys[0], ctx))
        } else {
            let parts: Vec<String> = keys.iter().map(|k| self.render(k, ctx)).collect();
            format!("&({})", parts.join(", "))
        }
    }

    /// Renders a value position expression, appending the explicit
    /// duplication call flagged during parsing.
    fn render_value(&mut self, expr: &ExpressionIR, ctx: EmitCtx) -> String {
        let text = self.render(expr, ctx);
        if expr.needs_clone {
            self.diagnostics.info(
                ctx.line,
                "inserted an explicit clone for a reference-typed value",
            );
            format!("{}.clone()", text)
        } else {
            text
        }
    }

    fn render(&mut self, expr: &ExpressionIR, ctx: EmitCtx) -> String {
        match &expr.kind {
            ExprKind::NumberLiteral(text) => text.replace('_', ""),
            ExprKind::HexLiteral(text) => text.clone(),
            ExprKind::StringLiteral(text) => format!("String::from(\"{}\")", text),
            ExprKind::BoolLiteral(value) => value.to_string(),
            ExprKind::Identifier(name) => self.render_identifier(name, ctx),
            ExprKind::Binary { op, left, right } => self.render_binary(*op, left, right, ctx),
            ExprKind::Unary { op, operand } => self.render_unary(*op, operand, ctx),
            ExprKind::Call { function, args } => self.render_call(function, args, ctx),
            ExprKind::Member { base, member } => self.render_member(base, member, ctx),
            ExprKind::Index { base, index } => self.render_index(expr, base, index, ctx),
            ExprKind::Cast { ty, value } => self.render_cast(ty, value, ctx),
            ExprKind::Ternary {
                condition,
                then_value,
                else_value,
            } => {
                let cond = self.render(condition, ctx);
                let then_text = self.render(then_value, ctx);
                let else_text = self.render(else_value, ctx);
                format!("if {} {{ {} }} else {{ {} }}", cond, then_text, else_text)
            }
            ExprKind::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(|e| self.render(e, ctx)).collect();
                format!("({})", parts.join(", "))
            }
            ExprKind::Limit { ty, max } => {
                let target = converter::limit_type(ty).unwrap_or("u128");
                format!("{}::{}", target, if *max { "MAX" } else { "MIN" })
            }
            ExprKind::EnvCaller => format!("{}.env().caller()", ctx.receiver),
            ExprKind::EnvValue => format!("{}.env().transferred_value()", ctx.receiver),
            ExprKind::EnvTimestamp => format!("{}.env().block_timestamp()", ctx.receiver),
            ExprKind::EnvBlockNumber => format!("{}.env().block_number()", ctx.receiver),
            ExprKind::EnvThis => format!("{}.env().account_id()", ctx.receiver),
            ExprKind::ZeroAddress => {
                self.imports
                    .insert(String::from("openbrush::traits::ZERO_ADDRESS"));
                String::from("ZERO_ADDRESS.into()")
            }
            ExprKind::IsZero(inner) => {
                self.imports
                    .insert(String::from("openbrush::traits::AccountIdExt"));
                format!("{}.is_zero()", self.render_atom(inner, ctx))
            }
            ExprKind::ArrayLength(base) => format!("{}.len()", self.render_atom(base, ctx)),
            ExprKind::Unsupported(raw) => raw.clone(),
        }
    }

    fn render_identifier(&mut self, name: &str, ctx: EmitCtx) -> String {
        match self.symbols.kind_of(name) {
            Some(SymbolKind::StateVar) => {
                format!("{}.data.{}", ctx.receiver, converter::snake(name))
            }
            Some(SymbolKind::Constant) => converter::screaming(name),
            Some(SymbolKind::Local) | Some(SymbolKind::Param) => converter::snake(name),
            Some(SymbolKind::Function) => converter::snake(name),
            _ => name.to_owned(),
        }
    }

    fn render_binary(
        &mut self,
        op: BinaryOp,
        left: &ExpressionIR,
        right: &ExpressionIR,
        ctx: EmitCtx,
    ) -> String {
        if op == BinaryOp::Pow {
            let base = self.render_atom(left, ctx);
            let exponent = self.render(right, ctx);
            return if matches!(right.kind, ExprKind::NumberLiteral(_)) {
                format!("{}.pow({})", base, exponent)
            } else {
                format!("{}.pow({} as u32)", base, exponent)
            };
        }
        let left_text = self.render_operand(left, precedence(op), false, ctx);
        let right_text = self.render_operand(right, precedence(op), true, ctx);
        format!("{} {} {}", left_text, op.as_str(), right_text)
    }

    fn render_operand(
        &mut self,
        expr: &ExpressionIR,
        parent: u8,
        right_side: bool,
        ctx: EmitCtx,
    ) -> String {
        let text = self.render(expr, ctx);
        let wrap = match &expr.kind {
            ExprKind::Binary { op, .. } => {
                let child = precedence(*op);
                child < parent || (child == parent && right_side)
            }
            ExprKind::Ternary { .. } => true,
            _ => false,
        };
        if wrap {
            format!("({})", text)
        } else {
            text
        }
    }

    /// Renders with parentheses unless the expression is already atomic
    /// enough to take a method call or prefix operator.
    fn render_atom(&mut self, expr: &ExpressionIR, ctx: EmitCtx) -> String {
        let text = self.render(expr, ctx);
        match &expr.kind {
            ExprKind::Binary { .. } | ExprKind::Ternary { .. } | ExprKind::Unary { .. } => {
                format!("({})", text)
            }
            _ => text,
        }
    }

    fn render_unary(&mut self, op: UnaryOp, operand: &ExpressionIR, ctx: EmitCtx) -> String {
        match op {
            UnaryOp::Not | UnaryOp::BitNot => format!("!{}", self.render_atom(operand, ctx)),
            UnaryOp::Neg => format!("-{}", self.render_atom(operand, ctx)),
            UnaryOp::Inc | UnaryOp::Dec => {
                self.diagnostics.warning(
                    ctx.line,
                    "increment/decrement inside an expression has no direct translation",
                );
                self.render(operand, ctx)
            }
        }
    }

    fn render_call(
        &mut self,
        function: &ExpressionIR,
        args: &[ExpressionIR],
        ctx: EmitCtx,
    ) -> String {
        if let ExprKind::Identifier(name) = &function.kind {
            match self.symbols.kind_of(name) {
                Some(SymbolKind::Function) => {
                    let visibility = self
                        .symbols
                        .resolve(name)
                        .map(|e| e.visibility)
                        .unwrap_or(Visibility::Public);
                    let rendered: Vec<String> =
                        args.iter().map(|a| self.render(a, ctx)).collect();
                    let callee = if visibility.is_message() {
                        converter::snake(name)
                    } else {
                        format!("_{}", converter::snake(name))
                    };
                    return format!(
                        "{}.{}({})?",
                        ctx.receiver,
                        callee,
                        rendered.join(", ")
                    );
                }
                Some(SymbolKind::Struct) => {
                    let fields = self
                        .symbols
                        .struct_fields(name)
                        .map(|f| f.to_vec())
                        .unwrap_or_default();
                    let mut parts = Vec::new();
                    for (i, arg) in args.iter().enumerate() {
                        let field = fields
                            .get(i)
                            .map(|(n, _)| converter::snake(n))
                            .unwrap_or_else(|| format!("field_{}", i));
                        parts.push(format!("{}: {}", field, self.render(arg, ctx)));
                    }
                    return format!("{} {{ {} }}", name, parts.join(", "));
                }
                _ => {}
            }
        }
        let rendered: Vec<String> = args.iter().map(|a| self.render(a, ctx)).collect();
        let callee = self.render(function, ctx);
        format!("{}({})", callee, rendered.join(", "))
    }

    fn render_member(&mut self, base: &ExpressionIR, member: &str, ctx: EmitCtx) -> String {
        if let ExprKind::Identifier(name) = &base.kind {
            if self.symbols.kind_of(name) == Some(SymbolKind::Enum) {
                return format!("{}::{}", name, converter::pascal(member));
            }
        }
        format!(
            "{}.{}",
            self.render_atom(base, ctx),
            converter::snake(member)
        )
    }

    fn render_index(
        &mut self,
        expr: &ExpressionIR,
        base: &ExpressionIR,
        index: &ExpressionIR,
        ctx: EmitCtx,
    ) -> String {
        if let Some((map, keys)) = self.mapping_access(expr) {
            let map_text = self.render(map, ctx);
            let key_text = self.render_keys(&keys, ctx);
            return format!("{}.get({}).unwrap_or_default()", map_text, key_text);
        }
        let base_text = self.render_atom(base, ctx);
        let index_text = self.render(index, ctx);
        if matches!(index.kind, ExprKind::NumberLiteral(_)) {
            format!("{}[{}]", base_text, index_text)
        } else if index_text.contains(' ') {
            format!("{}[({}) as usize]", base_text, index_text)
        } else {
            format!("{}[{} as usize]", base_text, index_text)
        }
    }

    fn render_cast(&mut self, ty: &SolType, value: &ExpressionIR, ctx: EmitCtx) -> String {
        match ty {
            SolType::Uint(_) | SolType::Int(_) => {
                let target = converter::convert_type(ty, &mut self.imports);
                format!("({} as {})", self.render(value, ctx), target)
            }
            SolType::Address | SolType::AddressPayable => {
                format!("AccountId::from({})", self.render(value, ctx))
            }
            _ => {
                self.diagnostics.info(
                    ctx.line,
                    "cast to a non-numeric type dropped during translation",
                );
                self.render(value, ctx)
            }
        }
    }

    /// Failure condition of a guard: comparisons flip their operator,
    /// everything else is wrapped in a negation.
    fn render_negated(&mut self, condition: &ExpressionIR, ctx: EmitCtx) -> String {
        match &condition.kind {
            ExprKind::Binary { op, left, right } => {
                if let Some(flipped) = op.negate() {
                    let left_text = self.render_operand(left, precedence(flipped), false, ctx);
                    let right_text = self.render_operand(right, precedence(flipped), true, ctx);
                    return format!("{} {} {}", left_text, flipped.as_str(), right_text);
                }
                format!("!({})", self.render_binary(*op, left, right, ctx))
            }
            ExprKind::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.render(operand, ctx),
            ExprKind::IsZero(inner) => {
                self.imports
                    .insert(String::from("openbrush::traits::AccountIdExt"));
                format!("!{}.is_zero()", self.render_atom(inner, ctx))
            }
            ExprKind::BoolLiteral(value) => (!value).to_string(),
            _ => format!("!({})", self.render(condition, ctx)),
        }
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Pow => 10,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 9,
        BinaryOp::Add | BinaryOp::Sub => 8,
        BinaryOp::Shl | BinaryOp::Shr => 7,
        BinaryOp::BitAnd => 6,
        BinaryOp::BitXor => 5,
        BinaryOp::BitOr => 4,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 3,
        BinaryOp::Eq | BinaryOp::Ne => 3,
        BinaryOp::And => 2,
        BinaryOp::Or => 1,
    }
}

/// Whether a statement run always leaves the function before falling
/// through, so no synthesized tail return is needed.
fn terminates(statements: &[StatementIR]) -> bool {
    match statements.last() {
        Some(StatementIR::Return(_)) | Some(StatementIR::Revert { .. }) => true,
        Some(StatementIR::If {
            then_branch,
            else_branch: Some(else_branch),
            ..
        }) => terminates(then_branch) && terminates(else_branch),
        Some(StatementIR::Block(body)) | Some(StatementIR::Unchecked(body)) => terminates(body),
        _ => false,
    }
}
