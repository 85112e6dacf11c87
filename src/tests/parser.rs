use crate::diagnostics::{Diagnostics, Severity};
use crate::parser::symbols::SymbolKind;
use crate::parser::{self, ParseError};
use crate::transpiler::ast::*;

fn parse(source: &str) -> (ContractUnit, crate::parser::symbols::SymbolTable, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let (unit, symbols) = parser::parse(source, &mut diagnostics).expect("parse failed");
    (unit, symbols, diagnostics)
}

#[test]
fn parses_basic_contract() {
    let source = r#"
        contract Counter {
            uint256 count;
            function increment() public {
                count = count + 1;
            }
        }
    "#;
    let (unit, _, diagnostics) = parse(source);
    assert_eq!(unit.name, "Counter");
    assert_eq!(unit.kind, ContractKind::Contract);
    assert_eq!(unit.fields.len(), 1);
    assert_eq!(unit.functions.len(), 1);
    assert!(diagnostics.is_empty());
}

#[test]
fn missing_definition_is_fatal() {
    let mut diagnostics = Diagnostics::new();
    let err = parser::parse("pragma solidity ^0.8.0;", &mut diagnostics).unwrap_err();
    assert_eq!(err, ParseError::MissingDefinition);
}

#[test]
fn parses_state_variable_flags() {
    let source = r#"
        contract Test {
            uint256 public total;
            bool private flag;
            address internal owner;
            uint256 constant LIMIT = 100;
        }
    "#;
    let (unit, _, _) = parse(source);
    assert_eq!(unit.fields.len(), 4);
    assert_eq!(unit.fields[0].visibility, Visibility::Public);
    assert_eq!(unit.fields[1].visibility, Visibility::Private);
    assert_eq!(unit.fields[2].visibility, Visibility::Internal);
    assert!(unit.fields[3].constant);
    assert!(matches!(
        unit.fields[3].initial,
        Some(ExpressionIR {
            kind: ExprKind::NumberLiteral(ref n),
            ..
        }) if n == "100"
    ));
}

#[test]
fn parses_function_signature() {
    let source = r#"
        contract Test {
            function transfer(address to, uint256 amount) external payable returns (bool) {
                return true;
            }
        }
    "#;
    let (unit, _, _) = parse(source);
    let function = &unit.functions[0];
    assert_eq!(function.name, "transfer");
    assert_eq!(function.visibility, Visibility::External);
    assert_eq!(function.mutability, Mutability::Payable);
    assert_eq!(function.params.len(), 2);
    assert_eq!(function.params[0].name, "to");
    assert_eq!(function.params[0].ty, SolType::Address);
    assert_eq!(function.returns.len(), 1);
    assert_eq!(function.returns[0].ty, SolType::Bool);
}

#[test]
fn parses_event_with_indexed_fields() {
    let source = r#"
        contract Test {
            event Transfer(address indexed from, address indexed to, uint256 value);
        }
    "#;
    let (unit, symbols, _) = parse(source);
    let event = &unit.events[0];
    assert_eq!(event.name, "Transfer");
    assert_eq!(event.fields.len(), 3);
    assert!(event.fields[0].indexed);
    assert!(event.fields[1].indexed);
    assert!(!event.fields[2].indexed);
    assert_eq!(symbols.event_fields("Transfer").map(|f| f.len()), Some(3));
}

#[test]
fn parses_struct_and_enum() {
    let source = r#"
        contract Test {
            struct Position {
                uint256 size;
                address owner;
            }
            enum Status { Open, Closed }
        }
    "#;
    let (unit, symbols, _) = parse(source);
    assert_eq!(unit.structs[0].name, "Position");
    assert_eq!(unit.structs[0].fields.len(), 2);
    assert_eq!(unit.enums[0].variants, vec!["Open", "Closed"]);
    assert_eq!(symbols.kind_of("Position"), Some(SymbolKind::Struct));
    assert_eq!(symbols.kind_of("Status"), Some(SymbolKind::Enum));
    assert_eq!(symbols.enum_variants("Status").map(|v| v.len()), Some(2));
    assert_eq!(
        symbols.struct_field_type("Position", "size"),
        Some(&SolType::Uint(256))
    );
}

#[test]
fn inheritance_clause_is_discarded_with_note() {
    let source = "contract A is B, C { }";
    let (unit, _, diagnostics) = parse(source);
    assert_eq!(unit.name, "A");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics
        .iter()
        .any(|d| d.severity == Severity::Info && d.message.contains("inheritance")));
}

#[test]
fn forward_references_resolve() {
    let source = r#"
        contract Test {
            function get() public view returns (uint256) {
                return value;
            }
            uint256 value;
        }
    "#;
    let (unit, symbols, diagnostics) = parse(source);
    match &unit.functions[0].body[0] {
        StatementIR::Return(Some(expr)) => assert_eq!(expr.ty, SolType::Uint(256)),
        other => panic!("expected a return statement, got {:?}", other),
    }
    assert_eq!(symbols.type_of("value"), Some(&SolType::Uint(256)));
    assert!(diagnostics.is_empty());
}

#[test]
fn unchecked_block_becomes_one_region() {
    let source = r#"
        contract Test {
            function bump(uint256 a) public {
                unchecked {
                    a += 1;
                    a += 2;
                }
            }
        }
    "#;
    let (unit, _, _) = parse(source);
    match &unit.functions[0].body[0] {
        StatementIR::Unchecked(inner) => assert_eq!(inner.len(), 2),
        other => panic!("expected an unchecked region, got {:?}", other),
    }
}

#[test]
fn comment_markers_become_one_region() {
    let source = r#"
        contract Test {
            function bump(uint256 a) public {
                // begin-unchecked
                a += 1;
                // end-unchecked
            }
        }
    "#;
    let (unit, _, _) = parse(source);
    assert_eq!(unit.functions[0].body.len(), 1);
    assert!(matches!(
        unit.functions[0].body[0],
        StatementIR::Unchecked(ref inner) if inner.len() == 1
    ));
}

#[test]
fn modifier_body_keeps_placeholder() {
    let source = r#"
        contract Test {
            address owner;
            modifier onlyOwner() {
                require(msg.sender == owner, "not owner");
                _;
            }
        }
    "#;
    let (unit, _, _) = parse(source);
    let modifier = &unit.modifiers[0];
    assert_eq!(modifier.name, "onlyOwner");
    assert_eq!(modifier.body.len(), 2);
    assert!(matches!(modifier.body[0], StatementIR::Require { .. }));
    assert!(matches!(modifier.body[1], StatementIR::ModifierPlaceholder));
}

#[test]
fn assembly_degrades_to_unsupported() {
    let source = r#"
        contract Test {
            function f() public {
                assembly { let x := 1 }
            }
        }
    "#;
    let (unit, _, diagnostics) = parse(source);
    assert!(matches!(
        unit.functions[0].body[0],
        StatementIR::Unsupported { .. }
    ));
    assert!(diagnostics
        .iter()
        .any(|d| d.severity == Severity::Warning && d.message.contains("assembly")));
}

#[test]
fn interface_functions_have_no_bodies() {
    let source = r#"
        interface IVault {
            function deposit(uint256 amount) external;
            function totalAssets() external view returns (uint256);
        }
    "#;
    let (unit, _, _) = parse(source);
    assert_eq!(unit.kind, ContractKind::Interface);
    assert_eq!(unit.functions.len(), 2);
    assert!(unit.functions.iter().all(|f| f.body.is_empty()));
    assert_eq!(unit.functions[1].mutability, Mutability::View);
}

#[test]
fn guard_calls_map_to_require_ir() {
    let source = r#"
        contract Test {
            function f(uint256 a) public {
                require(a > 0, "zero");
                assert(a < 100);
                revert("bad state");
            }
        }
    "#;
    let (unit, _, _) = parse(source);
    let body = &unit.functions[0].body;
    assert!(matches!(
        body[0],
        StatementIR::Require { message: Some(ref m), .. } if m == "zero"
    ));
    assert!(matches!(body[1], StatementIR::Require { message: None, .. }));
    assert!(matches!(
        body[2],
        StatementIR::Revert { message: Some(ref m) } if m == "bad state"
    ));
}

#[test]
fn mapping_types_parse_nested() {
    let source = r#"
        contract Test {
            mapping(address => mapping(address => uint256)) allowances;
        }
    "#;
    let (unit, _, _) = parse(source);
    match &unit.fields[0].ty {
        SolType::Mapping(key, value) => {
            assert_eq!(**key, SolType::Address);
            assert!(matches!(**value, SolType::Mapping(_, _)));
        }
        other => panic!("expected a mapping type, got {:?}", other),
    }
}

#[test]
fn locals_shadow_in_inner_scopes() {
    let source = r#"
        contract Test {
            uint256 value;
            function f() public view returns (uint256) {
                uint256 local = value;
                return local;
            }
        }
    "#;
    let (unit, _, diagnostics) = parse(source);
    assert!(matches!(
        unit.functions[0].body[0],
        StatementIR::Declaration { ref name, .. } if name == "local"
    ));
    assert!(diagnostics.is_empty());
}
