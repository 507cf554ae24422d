//! Property tests for the remote name mapper.

use depvault_sync::names::{remote_secret_name, RESERVED_PREFIX};
use proptest::prelude::*;

proptest! {
    #[test]
    fn mapping_is_deterministic(name in ".*") {
        prop_assert_eq!(remote_secret_name(&name), remote_secret_name(&name));
    }

    #[test]
    fn mapping_is_idempotent(name in ".*") {
        let once = remote_secret_name(&name);
        let twice = remote_secret_name(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn output_is_always_a_valid_remote_name(name in ".*") {
        let mapped = remote_secret_name(&name);

        prop_assert!(!mapped.is_empty());
        prop_assert!(
            mapped.chars().all(|c| matches!(c, 'A'..='Z' | '0'..='9' | '_')),
            "invalid character in {mapped}"
        );
        prop_assert!(
            !mapped.starts_with(|c: char| c.is_ascii_digit()),
            "digit-leading name {mapped}"
        );
        prop_assert!(
            !mapped.starts_with(RESERVED_PREFIX),
            "reserved name {mapped}"
        );
        prop_assert!(!mapped.contains("__"), "uncollapsed underscores in {mapped}");
    }
}
