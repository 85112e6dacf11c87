use crate::diagnostics::Severity;
use crate::parser::ParseError;
use crate::transpile;

#[test]
fn missing_definition_produces_no_output() {
    let err = transpile("pragma solidity ^0.8.0;\nimport \"./Other.sol\";\n").unwrap_err();
    assert_eq!(err, ParseError::MissingDefinition);
}

#[test]
fn pipeline_is_deterministic() {
    let source = r#"
        contract Mixed is Base {
            uint256 total;
            function f() public {
                assembly { let x := 1 }
                total += 1;
            }
        }
    "#;
    let (first_out, first_report) = transpile(source).expect("first run");
    let (second_out, second_report) = transpile(source).expect("second run");
    assert_eq!(first_out, second_out);
    assert_eq!(first_report, second_report);
}

#[test]
fn report_is_ordered_by_source_line() {
    let source = r#"
        contract Noisy is Base {
            function early() public {
                assembly { let x := 1 }
            }
            function late() public {
                assembly { let y := 2 }
            }
        }
    "#;
    let (_, report) = transpile(source).expect("translation failed");
    assert!(report.len() >= 3);
    for pair in report.windows(2) {
        assert!(pair[0].line <= pair[1].line);
    }
}

#[test]
fn unsupported_constructs_carry_markers() {
    let source = r#"
        contract Raw {
            function f() public {
                assembly { let x := 1 }
            }
        }
    "#;
    let (_, report) = transpile(source).expect("translation failed");
    assert!(report
        .iter()
        .any(|d| d.severity == Severity::Warning && d.marker.is_some()));
}

#[test]
fn unchecked_note_is_informational() {
    let source = r#"
        contract Counter {
            uint256 total;
            function bump() public {
                unchecked {
                    total += 1;
                }
            }
        }
    "#;
    let (_, report) = transpile(source).expect("translation failed");
    assert!(report
        .iter()
        .any(|d| d.severity == Severity::Info && d.message.contains("unchecked")));
}

#[test]
fn flipper_golden_output() {
    let source = r#"contract Flipper {
    bool value;
    function flip() public {
        value = !value;
    }
    function get() public view returns (bool) {
        return value;
    }
}
"#;
    let (out, report) = transpile(source).expect("translation failed");
    assert!(report.is_empty());
    let expected = r#"#![cfg_attr(not(feature = "std"), no_std)]
#![feature(min_specialization)]

#[openbrush::contract]
pub mod flipper {
    use ink_prelude::string::String;
    use ink_storage::traits::SpreadAllocate;
    use openbrush::traits::Storage;
    use scale::{Decode, Encode};

    #[derive(Debug, Encode, Decode, PartialEq)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        Custom(String),
    }

    pub const STORAGE_KEY: u32 = openbrush::storage_unique_key!(Data);

    #[derive(Default, Debug)]
    #[openbrush::upgradeable_storage(STORAGE_KEY)]
    pub struct Data {
        pub value: bool,
    }

    #[ink(storage)]
    #[derive(Default, SpreadAllocate, Storage)]
    pub struct Flipper {
        #[storage_field]
        data: Data,
    }

    impl Flipper {
        #[ink(constructor)]
        pub fn new() -> Self {
            ink_lang::codegen::initialize_contract(|instance: &mut Self| {})
        }

        #[ink(message)]
        pub fn flip(&mut self) -> Result<(), Error> {
            self.data.value = !self.data.value;
            Ok(())
        }

        #[ink(message)]
        pub fn get(&self) -> Result<bool, Error> {
            return Ok(self.data.value)
        }

    }
}
"#;
    assert_eq!(out, expected);
}
