//! Signature string → [`TypeDescriptor`].
//!
//! Grammar: `IDENT ('<' TYPE (',' TYPE)* '>')?`, where IDENT may carry a `&`
//! or `&mut` prefix. Generic argument lists nest to any depth, so parsing
//! keeps an explicit stack of partially-built frames instead of recursing.

use crate::address::{account_type_string, is_valid_move_address, SPLITTER};
use crate::error::TypeParseError;
use crate::types::TypeDescriptor;

/// Parse a Move type signature. Whitespace is ignored.
pub fn parse_move_type(signature: &str) -> Result<TypeDescriptor, TypeParseError> {
    let mut stack: Vec<TypeDescriptor> = vec![TypeDescriptor::new("")];
    let mut buffer = String::new();

    for (position, ch) in signature.char_indices() {
        match ch {
            c if c.is_whitespace() => {}
            '<' => {
                if buffer.is_empty() {
                    return Err(TypeParseError::EmptyName {
                        signature: signature.to_string(),
                        position,
                    });
                }
                let top = stack.last_mut().ok_or(TypeParseError::Empty)?;
                top.qname = std::mem::take(&mut buffer);
                adjust_type(top, signature, position)?;
                stack.push(TypeDescriptor::new(""));
            }
            '>' | ',' => {
                // the root frame is never closed by a delimiter
                if stack.len() < 2 {
                    return Err(TypeParseError::Unbalanced {
                        signature: signature.to_string(),
                        position,
                        ch,
                    });
                }
                let mut frame = stack.pop().ok_or(TypeParseError::Empty)?;
                if !buffer.is_empty() {
                    frame.qname = std::mem::take(&mut buffer);
                }
                if frame.qname.is_empty() {
                    return Err(TypeParseError::EmptyName {
                        signature: signature.to_string(),
                        position,
                    });
                }
                adjust_type(&mut frame, signature, position)?;
                if let Some(parent) = stack.last_mut() {
                    parent.type_args.push(frame);
                }
                if ch == ',' {
                    stack.push(TypeDescriptor::new(""));
                }
            }
            c => buffer.push(c),
        }
    }

    if stack.len() != 1 {
        return Err(TypeParseError::Unclosed {
            signature: signature.to_string(),
        });
    }
    let mut root = stack.pop().ok_or(TypeParseError::Empty)?;
    if !buffer.is_empty() {
        if !root.qname.is_empty() {
            return Err(TypeParseError::Trailing {
                signature: signature.to_string(),
                trailing: buffer,
            });
        }
        root.qname = buffer;
    }
    if root.qname.is_empty() {
        return Err(TypeParseError::Empty);
    }
    adjust_type(&mut root, signature, signature.len())?;
    Ok(root)
}

/// Strip the borrow prefix and canonicalize the account segment.
///
/// A bare `&` or `&mut` leaves no name behind and is rejected.
fn adjust_type(
    ty: &mut TypeDescriptor,
    signature: &str,
    position: usize,
) -> Result<(), TypeParseError> {
    if let Some(rest) = ty.qname.strip_prefix('&') {
        ty.reference = true;
        ty.qname = rest.to_string();
        if let Some(rest) = ty.qname.strip_prefix("mut") {
            ty.mutable = true;
            ty.qname = rest.to_string();
        }
    }
    if ty.qname.is_empty() {
        return Err(TypeParseError::EmptyName {
            signature: signature.to_string(),
            position,
        });
    }
    if let Some((account, rest)) = ty.qname.split_once(SPLITTER) {
        if is_valid_move_address(account) {
            ty.qname = format!("{}{SPLITTER}{rest}", account_type_string(account));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_generics() {
        let ty = parse_move_type("x<g1<a,g2<c,d>>,b,g3<a,b>,e>").unwrap();
        assert_eq!(ty.qname, "x");
        assert_eq!(ty.type_args.len(), 4);
        let g2 = &ty.type_args[0].type_args[1];
        assert_eq!(g2.qname, "g2");
        assert_eq!(g2.type_args[1].qname, "d");
        assert_eq!(ty.type_args[2].qname, "g3");
        assert_eq!(ty.type_args[3].qname, "e");
    }

    #[test]
    fn round_trip() {
        for sig in [
            "u64",
            "vector<u8>",
            "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>",
            "0x1::table::Table<address, vector<0x1::option::Option<u128>>>",
            "&signer",
            "&mut 0x2::tx_context::TxContext",
            "x<g1<a, g2<c, d>>, b, g3<a, b>, e>",
        ] {
            let parsed = parse_move_type(sig).unwrap();
            assert_eq!(parsed.signature(), sig);
            assert_eq!(parse_move_type(&parsed.signature()).unwrap(), parsed);
        }
    }

    #[test]
    fn references() {
        let ty = parse_move_type("&mut 0x2::coin::Coin<T0>").unwrap();
        assert!(ty.reference);
        assert!(ty.mutable);
        assert_eq!(ty.qname, "0x2::coin::Coin");

        let ty = parse_move_type("&signer").unwrap();
        assert!(ty.reference);
        assert!(!ty.mutable);
        assert_eq!(ty.qname, "signer");

        // a type merely starting with "mut" is not a mutable borrow
        let ty = parse_move_type("0x1::mutex::Mutex").unwrap();
        assert!(!ty.mutable);
    }

    #[test]
    fn canonicalizes_accounts() {
        let ty = parse_move_type(
            "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
        )
        .unwrap();
        assert_eq!(ty.qname, "0x2::sui::SUI");

        let ty = parse_move_type("0x02::coin::Coin<0x0002::sui::SUI>").unwrap();
        assert_eq!(ty.signature(), "0x2::coin::Coin<0x2::sui::SUI>");
    }

    #[test]
    fn whitespace_ignored() {
        let a = parse_move_type(" 0x1::m::S < u8 ,  vector< u64 > > ").unwrap();
        let b = parse_move_type("0x1::m::S<u8,vector<u64>>").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed() {
        assert!(matches!(
            parse_move_type("a<b>>"),
            Err(TypeParseError::Unbalanced { ch: '>', .. })
        ));
        assert!(matches!(
            parse_move_type("a<b"),
            Err(TypeParseError::Unclosed { .. })
        ));
        assert!(matches!(
            parse_move_type("a,b"),
            Err(TypeParseError::Unbalanced { ch: ',', .. })
        ));
        assert!(matches!(
            parse_move_type("a<b>c"),
            Err(TypeParseError::Trailing { .. })
        ));
        assert!(matches!(
            parse_move_type("a<,b>"),
            Err(TypeParseError::EmptyName { .. })
        ));
        assert!(matches!(parse_move_type("  "), Err(TypeParseError::Empty)));
    }

    #[test]
    fn bare_borrow_has_no_name() {
        for sig in ["&", "&mut ", "&mut", "vector<&mut>", "&<u8>"] {
            assert!(
                matches!(parse_move_type(sig), Err(TypeParseError::EmptyName { .. })),
                "{sig}"
            );
        }
    }
}
