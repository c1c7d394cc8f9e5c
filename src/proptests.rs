//! Property-based tests for the guest identity codec.
//!
//! - Every valid alias survives issue then resolve unchanged
//! - Changing any single character of either cookie never resolves
//! - Tokens never verify under a different secret

use chrono::Duration;
use proptest::{prelude::*, sample::Index};

use crate::{Alias, GuestIdentityCodec};

fn codec(secret: &str) -> GuestIdentityCodec {
    GuestIdentityCodec::new(secret, Duration::days(7)).unwrap()
}

fn replace_char(s: &str, index: &Index, replacement: u8) -> Option<String> {
    let mut bytes = s.as_bytes().to_vec();
    let i = index.index(bytes.len());
    if bytes[i] == replacement {
        return None;
    }
    bytes[i] = replacement;
    String::from_utf8(bytes).ok()
}

proptest! {
    #[test]
    fn issue_then_resolve_roundtrips(
        alias in "[a-z0-9]{3,20}",
        secret in "[ -~]{1,40}"
    ) {
        let codec = codec(&secret);
        let alias = Alias::parse(&alias).unwrap();
        let token = codec.issue(&alias);

        prop_assert_eq!(codec.resolve(Some(&token.value), Some(&token.tag)), Some(alias));
    }

    #[test]
    fn single_char_change_in_value_never_resolves(
        alias in "[a-z0-9]{3,20}",
        index in any::<Index>(),
        replacement in 0x21u8..0x7f
    ) {
        let codec = codec("default_salt_value");
        let token = codec.issue(&Alias::parse(&alias).unwrap());
        let forged = replace_char(&token.value, &index, replacement);
        prop_assume!(forged.is_some());
        let forged = forged.unwrap();

        prop_assert_eq!(codec.resolve(Some(&forged), Some(&token.tag)), None);
    }

    #[test]
    fn single_char_change_in_tag_never_resolves(
        alias in "[a-z0-9]{3,20}",
        index in any::<Index>(),
        replacement in 0x21u8..0x7f
    ) {
        let codec = codec("default_salt_value");
        let token = codec.issue(&Alias::parse(&alias).unwrap());
        let forged = replace_char(&token.tag, &index, replacement);
        prop_assume!(forged.is_some());
        let forged = forged.unwrap();

        prop_assert_eq!(codec.resolve(Some(&token.value), Some(&forged)), None);
    }

    #[test]
    fn other_secret_never_resolves(
        alias in "[a-z0-9]{3,20}",
        first in "[a-zA-Z0-9]{8,32}",
        second in "[a-zA-Z0-9]{8,32}"
    ) {
        prop_assume!(first != second);
        let token = codec(&first).issue(&Alias::parse(&alias).unwrap());

        prop_assert_eq!(codec(&second).resolve(Some(&token.value), Some(&token.tag)), None);
    }

    #[test]
    fn arbitrary_cookies_never_panic(value in ".{0,64}", tag in ".{0,80}") {
        let _ = codec("default_salt_value").resolve(Some(&value), Some(&tag));
    }
}
