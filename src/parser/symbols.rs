//! Symbol and type table for one contract unit.
//!
//! Built incrementally by the declaration parser (and, for locals, the
//! statement parser), queried by the expression parser and the assembler.
//! Lookups resolve innermost-scope-first. The table lives exactly as long
//! as its contract unit and is read-only once body parsing begins for the
//! assembler's benefit.

use crate::transpiler::ast::{SolType, Visibility};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    StateVar,
    Constant,
    Function,
    Struct,
    Enum,
    Event,
    Modifier,
    Local,
    Param,
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub ty: SolType,
    pub kind: SymbolKind,
    pub visibility: Visibility,
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, SymbolEntry>>,
    /// Event name -> declared fields, for emit-site argument naming.
    event_fields: FxHashMap<String, Vec<(String, SolType)>>,
    /// Struct name -> fields, for member-access type inference and
    /// positional struct construction.
    struct_fields: FxHashMap<String, Vec<(String, SolType)>>,
    /// Enum name -> variants.
    enum_variants: FxHashMap<String, Vec<String>>,
    /// Function name -> declared return types.
    function_returns: FxHashMap<String, Vec<SolType>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![FxHashMap::default()],
            event_fields: FxHashMap::default(),
            struct_fields: FxHashMap::default(),
            enum_variants: FxHashMap::default(),
            function_returns: FxHashMap::default(),
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit_scope(&mut self) {
        // the contract scope itself is never popped
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declares a symbol in the innermost scope. Returns `false` if the
    /// name already exists there; the caller decides whether that is
    /// worth a diagnostic.
    pub fn declare(&mut self, entry: SymbolEntry) -> bool {
        let scope = self.scopes.last_mut().expect("at least one scope");
        if scope.contains_key(&entry.name) {
            return false;
        }
        scope.insert(entry.name.clone(), entry);
        true
    }

    pub fn resolve(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.resolve(name).map(|entry| entry.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&SolType> {
        self.resolve(name).map(|entry| &entry.ty)
    }

    pub fn record_event(&mut self, name: &str, fields: Vec<(String, SolType)>) {
        self.event_fields.insert(name.to_owned(), fields);
    }

    pub fn event_fields(&self, name: &str) -> Option<&[(String, SolType)]> {
        self.event_fields.get(name).map(Vec::as_slice)
    }

    pub fn record_struct(&mut self, name: &str, fields: Vec<(String, SolType)>) {
        self.struct_fields.insert(name.to_owned(), fields);
    }

    pub fn struct_fields(&self, name: &str) -> Option<&[(String, SolType)]> {
        self.struct_fields.get(name).map(Vec::as_slice)
    }

    pub fn struct_field_type(&self, name: &str, field: &str) -> Option<&SolType> {
        self.struct_fields
            .get(name)?
            .iter()
            .find(|(field_name, _)| field_name == field)
            .map(|(_, ty)| ty)
    }

    pub fn record_enum(&mut self, name: &str, variants: Vec<String>) {
        self.enum_variants.insert(name.to_owned(), variants);
    }

    pub fn enum_variants(&self, name: &str) -> Option<&[String]> {
        self.enum_variants.get(name).map(Vec::as_slice)
    }

    pub fn record_function_returns(&mut self, name: &str, returns: Vec<SolType>) {
        self.function_returns.insert(name.to_owned(), returns);
    }

    pub fn function_returns(&self, name: &str) -> Option<&[SolType]> {
        self.function_returns.get(name).map(Vec::as_slice)
    }
}
