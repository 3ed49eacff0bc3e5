//! Account address helpers.
//!
//! Move addresses appear on the wire with inconsistent zero-padding
//! (`0x1`, `0x0000…0001`, `0X01`). Everything keyed by account inside the
//! registry goes through [`account_type_string`] first so that equivalent
//! addresses collide.

use crate::error::TypeParseError;

/// Separator between account, module and name in a qualified type name.
pub const SPLITTER: &str = "::";

/// Length of a Move address in bytes.
pub const MOVE_ADDRESS_LENGTH: usize = 32;

/// Short canonical form: lowercase, `0x` prefix, no leading zeros.
///
/// The all-zero address becomes `0x0`.
pub fn account_type_string(account: &str) -> String {
    let lower = account.to_lowercase();
    let without_prefix = lower.strip_prefix("0x").unwrap_or(&lower);
    let trimmed = without_prefix.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}

/// Whether `value` is a hex string of at most 32 bytes, with or without prefix.
pub fn is_valid_move_address(value: &str) -> bool {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    !digits.is_empty()
        && digits.len() <= MOVE_ADDRESS_LENGTH * 2
        && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Full 32-byte form: `0x` followed by 64 lowercase hex digits.
pub fn account_address_string(account: &str) -> Result<String, TypeParseError> {
    if !is_valid_move_address(account) {
        return Err(TypeParseError::InvalidAddress(account.to_string()));
    }
    let lower = account.to_lowercase();
    let digits = lower.strip_prefix("0x").unwrap_or(&lower);
    Ok(format!("0x{digits:0>64}"))
}

/// Framework accounts are `0x0` through `0xf`.
pub fn is_framework_account(account: &str) -> bool {
    let digits = account.strip_prefix("0x").unwrap_or(account);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    digits.trim_start_matches('0').len() <= 1
}

/// `account::module` key with the account canonicalized.
pub fn module_qname(address: &str, module: &str) -> String {
    format!("{}{SPLITTER}{module}", account_type_string(address))
}

/// `account::module::name` key with the account canonicalized.
pub fn struct_qname(address: &str, module: &str, name: &str) -> String {
    format!("{}{SPLITTER}{name}", module_qname(address, module))
}

/// Split a qualified type name into `(account, module)`.
///
/// Returns `None` for primitives and bare placeholders.
pub fn module_qname_for_type(qname: &str) -> Option<(&str, &str)> {
    let mut parts = qname.split(SPLITTER);
    let account = parts.next()?;
    let module = parts.next()?;
    Some((account, module))
}
