//! Intermediate representation of a parsed contract.
//!
//! Every layer carries an explicit "unsupported" arm with the raw source
//! text, so untranslatable input degrades to a marked placeholder instead
//! of failing the pipeline.

/// Structured form of a Solidity type. `Unknown` marks a failed inference;
/// rewrite rules that depend on the type are skipped for such nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolType {
    Uint(u16),
    Int(u16),
    Bool,
    Address,
    AddressPayable,
    String,
    Bytes,
    FixedBytes(u8),
    Array(Box<SolType>),
    Mapping(Box<SolType>, Box<SolType>),
    Custom(String),
    Unknown,
}

impl SolType {
    /// Owned reference data in the destination language; assignment and
    /// return of such values need an explicit duplication call.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            SolType::String | SolType::Bytes | SolType::Array(_) | SolType::Custom(_)
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, SolType::Uint(_) | SolType::Int(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, SolType::Mapping(_, _))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Contract,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    External,
    Internal,
    Private,
}

impl Visibility {
    /// Public and external members become `#[ink(message)]` functions;
    /// the rest keep the private naming convention.
    pub fn is_message(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::External)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Nonpayable,
    View,
    Pure,
    Payable,
}

impl Mutability {
    pub fn is_readonly(&self) -> bool {
        matches!(self, Mutability::View | Mutability::Pure)
    }
}

/// The top-level parsed entity, one per source file. Members stay in
/// source declaration order; `comments` holds the doc comments found
/// immediately above the definition.
#[derive(Debug)]
pub struct ContractUnit {
    pub kind: ContractKind,
    pub name: String,
    pub comments: Vec<String>,
    pub fields: Vec<ContractField>,
    pub structs: Vec<StructDef>,
    pub enums: Vec<EnumDef>,
    pub events: Vec<EventDef>,
    pub modifiers: Vec<ModifierDef>,
    pub constructor: Option<FunctionIR>,
    pub functions: Vec<FunctionIR>,
    /// Members that could not be classified; kept verbatim so the
    /// assembler can surface them as review markers.
    pub unsupported: Vec<String>,
}

impl ContractUnit {
    pub fn new(kind: ContractKind, name: String, comments: Vec<String>) -> Self {
        ContractUnit {
            kind,
            name,
            comments,
            fields: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            events: Vec::new(),
            modifiers: Vec::new(),
            constructor: None,
            functions: Vec::new(),
            unsupported: Vec::new(),
        }
    }
}

/// A state variable declaration. Constants are kept here too and routed
/// to module-level `const` items at assembly time.
#[derive(Debug)]
pub struct ContractField {
    pub name: String,
    pub ty: SolType,
    pub visibility: Visibility,
    pub constant: bool,
    pub initial: Option<ExpressionIR>,
    pub comments: Vec<String>,
    pub line: usize,
}

#[derive(Debug)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Param>,
    pub comments: Vec<String>,
}

#[derive(Debug)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
    pub comments: Vec<String>,
}

#[derive(Debug)]
pub struct EventDef {
    pub name: String,
    pub fields: Vec<EventField>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EventField {
    pub name: String,
    pub ty: SolType,
    pub indexed: bool,
}

#[derive(Debug)]
pub struct ModifierDef {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<StatementIR>,
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: SolType,
}

#[derive(Debug)]
pub struct FunctionIR {
    pub name: String,
    pub params: Vec<Param>,
    /// Return parameters; names may be empty strings for unnamed returns.
    pub returns: Vec<Param>,
    pub visibility: Visibility,
    pub mutability: Mutability,
    /// Raw text of each modifier invocation, e.g. `onlyOwner` or
    /// `lock(id)`; surfaced as review markers at assembly time.
    pub modifiers: Vec<String>,
    pub body: Vec<StatementIR>,
    pub comments: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
        }
    }

    pub fn from_str(text: &str) -> Option<AssignOp> {
        Some(match text {
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Mod,
            "&=" => AssignOp::BitAnd,
            "|=" => AssignOp::BitOr,
            "^=" => AssignOp::BitXor,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            _ => return None,
        })
    }
}

/// One parsed statement. Unrecognized statement shapes become
/// `Unsupported` carrying the original token text verbatim.
#[derive(Debug)]
pub enum StatementIR {
    Expression(ExpressionIR),
    Declaration {
        name: String,
        ty: SolType,
        value: Option<ExpressionIR>,
    },
    Assign {
        target: ExpressionIR,
        op: AssignOp,
        value: ExpressionIR,
    },
    If {
        condition: ExpressionIR,
        then_branch: Vec<StatementIR>,
        else_branch: Option<Vec<StatementIR>>,
    },
    While {
        condition: ExpressionIR,
        body: Vec<StatementIR>,
    },
    DoWhile {
        body: Vec<StatementIR>,
        condition: ExpressionIR,
    },
    For {
        init: Option<Box<StatementIR>>,
        condition: Option<ExpressionIR>,
        update: Option<Box<StatementIR>>,
        body: Vec<StatementIR>,
    },
    Return(Option<ExpressionIR>),
    Emit {
        event: String,
        args: Vec<ExpressionIR>,
    },
    /// `require`/`assert` guard; `revert` is the message-only form with a
    /// `false` condition.
    Require {
        condition: ExpressionIR,
        message: Option<String>,
    },
    Revert {
        message: Option<String>,
    },
    Delete(ExpressionIR),
    Break,
    Continue,
    Block(Vec<StatementIR>),
    /// A contiguous statement run exempt from overflow checks in the
    /// source. Preserved as a delimited, marked region in the output;
    /// the arithmetic inside is not reinterpreted.
    Unchecked(Vec<StatementIR>),
    /// The `_;` placeholder inside a modifier body.
    ModifierPlaceholder,
    Comment(String),
    Unsupported {
        raw: String,
        line: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Flipped comparison, used to turn a `require` guard into its
    /// failure condition without wrapping the whole expression in `!()`.
    pub fn negate(&self) -> Option<BinaryOp> {
        Some(match self {
            BinaryOp::Eq => BinaryOp::Ne,
            BinaryOp::Ne => BinaryOp::Eq,
            BinaryOp::Lt => BinaryOp::Ge,
            BinaryOp::Ge => BinaryOp::Lt,
            BinaryOp::Gt => BinaryOp::Le,
            BinaryOp::Le => BinaryOp::Gt,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Inc,
    Dec,
}

/// One parsed expression together with its inferred type. Inference
/// failures leave `ty` as `SolType::Unknown` rather than failing the
/// parse. `needs_clone` flags reference-typed values whose use requires
/// an explicit duplication call in the output.
#[derive(Debug)]
pub struct ExpressionIR {
    pub kind: ExprKind,
    pub ty: SolType,
    pub needs_clone: bool,
}

impl ExpressionIR {
    pub fn new(kind: ExprKind, ty: SolType) -> Self {
        ExpressionIR {
            kind,
            ty,
            needs_clone: false,
        }
    }

    /// Marks this expression as needing duplication if its type is owned
    /// reference data and the expression reads an existing value rather
    /// than constructing a fresh one.
    pub fn mark_clone(&mut self) {
        if self.ty.is_reference()
            && matches!(
                self.kind,
                ExprKind::Identifier(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
            )
        {
            self.needs_clone = true;
        }
    }
}

#[derive(Debug)]
pub enum ExprKind {
    NumberLiteral(String),
    HexLiteral(String),
    StringLiteral(String),
    BoolLiteral(bool),
    Identifier(String),
    Binary {
        op: BinaryOp,
        left: Box<ExpressionIR>,
        right: Box<ExpressionIR>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExpressionIR>,
    },
    Call {
        function: Box<ExpressionIR>,
        args: Vec<ExpressionIR>,
    },
    Member {
        base: Box<ExpressionIR>,
        member: String,
    },
    Index {
        base: Box<ExpressionIR>,
        index: Box<ExpressionIR>,
    },
    Cast {
        ty: SolType,
        value: Box<ExpressionIR>,
    },
    Ternary {
        condition: Box<ExpressionIR>,
        then_value: Box<ExpressionIR>,
        else_value: Box<ExpressionIR>,
    },
    Tuple(Vec<ExpressionIR>),
    /// `type(T).max` / `type(T).min`, rewritten to the destination
    /// integer limit constant for the inferred width.
    Limit {
        ty: SolType,
        max: bool,
    },
    /// `msg.sender`
    EnvCaller,
    /// `msg.value`
    EnvValue,
    /// `block.timestamp`
    EnvTimestamp,
    /// `block.number`
    EnvBlockNumber,
    /// `address(this)`
    EnvThis,
    /// `address(0)`
    ZeroAddress,
    /// `x == address(0)` and its negation collapse to an `is_zero` check.
    IsZero(Box<ExpressionIR>),
    /// `<array>.length`
    ArrayLength(Box<ExpressionIR>),
    Unsupported(String),
}
