use crate::transpile;

fn output(source: &str) -> String {
    transpile(source).expect("translation failed").0
}

#[test]
fn storage_container_holds_fields_in_order() {
    let source = r#"
        contract Vault {
            uint256 total;
            address owner;
            bool locked;
        }
    "#;
    let out = output(source);
    assert!(out.contains("pub const STORAGE_KEY: u32 = openbrush::storage_unique_key!(Data);"));
    assert!(out.contains("#[openbrush::upgradeable_storage(STORAGE_KEY)]"));
    let total = out.find("pub total: u128,").expect("total field");
    let owner = out.find("pub owner: AccountId,").expect("owner field");
    let locked = out.find("pub locked: bool,").expect("locked field");
    assert!(total < owner && owner < locked);
    assert_eq!(out.matches("pub total: u128,").count(), 1);
    // the contract type holds the container as its only storage field
    assert!(out.contains("#[ink(storage)]"));
    assert!(out.contains("#[storage_field]"));
    assert!(out.contains("data: Data,"));
}

#[test]
fn constructor_is_synthesized_when_missing() {
    let out = output("contract Empty { }");
    assert_eq!(out.matches("#[ink(constructor)]").count(), 1);
    assert!(out.contains("pub fn new() -> Self {"));
    assert!(out.contains("ink_lang::codegen::initialize_contract(|instance: &mut Self| {})"));
}

#[test]
fn declared_constructor_is_translated() {
    let source = r#"
        contract Token {
            string name;
            constructor(string memory name_) {
                name = name_;
            }
        }
    "#;
    let out = output(source);
    assert_eq!(out.matches("#[ink(constructor)]").count(), 1);
    assert!(out.contains("pub fn new(name: String) -> Self {"));
    assert!(out.contains("instance.data.name = name.clone();"));
}

#[test]
fn numeric_limits_rewrite_to_destination_constants() {
    let source = r#"
        contract Limits {
            function maxWide() public pure returns (uint256) {
                return type(uint256).max;
            }
            function maxNarrow() public pure returns (uint8) {
                return type(uint8).max;
            }
            function minSigned() public pure returns (int64) {
                return type(int64).min;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("return Ok(u128::MAX)"));
    assert!(out.contains("return Ok(u8::MAX)"));
    assert!(out.contains("return Ok(i64::MIN)"));
}

#[test]
fn string_return_gains_explicit_clone() {
    let source = r#"
        contract Greeter {
            string greeting;
            function greet() public view returns (string memory) {
                return greeting;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("return Ok(self.data.greeting.clone())"));
}

#[test]
fn require_becomes_negated_guard() {
    let source = r#"
        contract Bank {
            mapping(address => uint256) balances;
            function withdraw(uint256 amount) public {
                require(amount <= balances[msg.sender], "insufficient");
                balances[msg.sender] -= amount;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains(
        "if amount > self.data.balances.get(&self.env().caller()).unwrap_or_default() {"
    ));
    assert!(out.contains("return Err(Error::Custom(String::from(\"insufficient\")))"));
    assert!(out.contains(
        "self.data.balances.insert(&self.env().caller(), \
         &(self.data.balances.get(&self.env().caller()).unwrap_or_default() - amount));"
    ));
}

#[test]
fn zero_address_check_collapses_to_is_zero() {
    let source = r#"
        contract Token {
            function check(address to) public pure {
                require(to != address(0), "zero address");
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("if to.is_zero() {"));
    assert!(out.contains("use openbrush::traits::AccountIdExt;"));
}

#[test]
fn unchecked_region_is_marked_and_ordered() {
    let source = r#"
        contract Counter {
            uint256 total;
            uint256 count;
            function bump() public {
                unchecked {
                    total += 1;
                    count += 2;
                }
            }
        }
    "#;
    let out = output(source);
    let open = out
        .find("// Please handle unchecked blocks manually >>>")
        .expect("open marker");
    let first = out.find("self.data.total += 1;").expect("first statement");
    let second = out.find("self.data.count += 2;").expect("second statement");
    let close = out
        .find("// <<< Please handle unchecked blocks manually")
        .expect("close marker");
    assert!(open < first && first < second && second < close);
}

#[test]
fn emit_uses_declared_event_fields() {
    let source = r#"
        contract Token {
            event Transfer(address indexed from, address indexed to, uint256 value);
            function ping(address to, uint256 amount) public {
                emit Transfer(msg.sender, to, amount);
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("self.env().emit_event(Transfer {"));
    assert!(out.contains("from: self.env().caller(),"));
    assert!(out.contains("to: to,"));
    assert!(out.contains("value: amount,"));
    // the event type itself
    assert!(out.contains("#[ink(event)]"));
    assert!(out.contains("#[ink(topic)]"));
}

#[test]
fn internal_functions_keep_private_naming() {
    let source = r#"
        contract Token {
            uint256 total;
            function _mint(uint256 amount) internal {
                total = total + amount;
            }
            function mint(uint256 amount) public {
                _mint(amount);
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("fn _mint(&mut self, amount: u128) -> Result<(), Error> {"));
    assert!(!out.contains("pub fn _mint"));
    assert!(out.contains("self._mint(amount)?;"));
    assert_eq!(out.matches("#[ink(message)]").count(), 1);
}

#[test]
fn public_state_variables_get_getters() {
    let source = r#"
        contract Token {
            uint256 public total;
            mapping(address => uint256) public balanceOf;
        }
    "#;
    let out = output(source);
    assert!(out.contains("pub fn total(&self) -> Result<u128, Error> {"));
    assert!(out.contains("return Ok(self.data.total)"));
    assert!(out.contains("pub fn balance_of(&self, key_0: AccountId) -> Result<u128, Error> {"));
    assert!(out.contains("return Ok(self.data.balance_of.get(&key_0).unwrap_or_default())"));
}

#[test]
fn constants_become_module_consts() {
    let source = r#"
        contract Config {
            uint256 constant maxSupply = 1000;
            uint256 supply;
        }
    "#;
    let out = output(source);
    assert!(out.contains("pub const MAX_SUPPLY: u128 = 1000;"));
    // constants take no storage slot
    assert!(!out.contains("pub max_supply"));
    assert!(out.contains("pub supply: u128,"));
}

#[test]
fn for_loop_desugars_to_while() {
    let source = r#"
        contract Sum {
            function sum(uint256 n) public pure returns (uint256) {
                uint256 total = 0;
                for (uint256 i = 0; i < n; i++) {
                    total += i;
                }
                return total;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("let i: u128 = 0;"));
    assert!(out.contains("while i < n {"));
    assert!(out.contains("total += i;"));
    assert!(out.contains("i += 1;"));
    assert!(out.contains("return Ok(total)"));
}

#[test]
fn else_if_chains_stay_flat() {
    let source = r#"
        contract Cmp {
            function cmp(uint256 a, uint256 b) public pure returns (uint256) {
                if (a > b) {
                    return 1;
                } else if (a < b) {
                    return 2;
                } else {
                    return 3;
                }
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("if a > b {"));
    assert!(out.contains("} else if a < b {"));
    assert!(out.contains("} else {"));
    // every branch returns, so no synthesized tail
    assert!(!out.contains("todo!()"));
}

#[test]
fn unsupported_statement_keeps_original_text() {
    let source = r#"
        contract Raw {
            function f() public {
                assembly { let x := 1 }
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("// Please translate the following statement manually >>>"));
    assert!(out.contains("// assembly {"));
}

#[test]
fn interface_becomes_trait_definition() {
    let source = r#"
        interface IERC20 {
            function totalSupply() external view returns (uint256);
            function transfer(address to, uint256 amount) external returns (bool);
        }
    "#;
    let out = output(source);
    assert!(out.contains("#[openbrush::wrapper]"));
    assert!(out.contains("pub type ERC20Ref = dyn ERC20;"));
    assert!(out.contains("#[openbrush::trait_definition]"));
    assert!(out.contains("pub trait ERC20 {"));
    assert!(out.contains("fn total_supply(&self) -> Result<u128, Error>;"));
    assert!(out.contains("fn transfer(&mut self, to: AccountId, amount: u128) -> Result<bool, Error>;"));
}

#[test]
fn doc_comments_are_carried_over() {
    let source = r#"
        /// A very simple vault
        contract Vault {
            /// total value locked
            uint256 total;
        }
    "#;
    let out = output(source);
    assert!(out.contains("/// A very simple vault"));
    assert!(out.contains("/// total value locked"));
}

#[test]
fn view_functions_take_shared_receiver() {
    let source = r#"
        contract Box {
            uint256 value;
            function get() public view returns (uint256) {
                return value;
            }
            function set(uint256 value_) public {
                value = value_;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("pub fn get(&self) -> Result<u128, Error> {"));
    assert!(out.contains("pub fn set(&mut self, value: u128) -> Result<(), Error> {"));
}

#[test]
fn payable_functions_are_marked() {
    let source = r#"
        contract Fund {
            uint256 raised;
            function donate() public payable {
                raised += msg.value;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("#[ink(message, payable)]"));
    assert!(out.contains("self.data.raised += self.env().transferred_value();"));
}

#[test]
fn ternary_renders_as_if_expression() {
    let source = r#"
        contract Math {
            function max(uint256 a, uint256 b) public pure returns (uint256) {
                return a > b ? a : b;
            }
        }
    "#;
    let out = output(source);
    assert!(out.contains("return Ok(if a > b { a } else { b })"));
}

#[test]
fn fixed_output_structure_order() {
    let source = r#"
        contract Ordered {
            event Ping(uint256 value);
            uint256 count;
            function ping() public {
                emit Ping(count);
            }
        }
    "#;
    let out = output(source);
    let header = out.find("#[openbrush::contract]").expect("header");
    let error = out.find("pub enum Error {").expect("error enum");
    let event = out.find("#[ink(event)]").expect("event");
    let storage = out.find("pub const STORAGE_KEY").expect("storage key");
    let implementation = out.find("impl Ordered {").expect("impl block");
    assert!(header < error && error < event && event < storage && storage < implementation);
}
