//! Structural matching of a type pattern against a concrete type.
//!
//! A pattern is an ordinary [`TypeDescriptor`] in which any node may be the
//! wildcard `any`, e.g. `0x1::pool::Pool<0x1::coin::USD, any>`.

use crate::types::{TypeDescriptor, ANY_TYPE};

/// Whether `candidate` is an instance of `pattern`.
///
/// A wildcard matches any subtree. Built-in keywords compare case-insensitively.
/// Pattern arguments are compared positionally; if the pattern has more
/// arguments than the candidate the match fails.
pub fn match_type(pattern: &TypeDescriptor, candidate: &TypeDescriptor) -> bool {
    if pattern.qname == ANY_TYPE {
        return true;
    }
    if !pattern.compare_qname(candidate) {
        return false;
    }
    pattern.type_args.iter().enumerate().all(|(idx, arg)| {
        candidate
            .type_args
            .get(idx)
            .is_some_and(|c| match_type(arg, c))
    })
}
