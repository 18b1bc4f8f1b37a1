//! Property-based tests for work-directory addressing.
//!
//! These tests use proptest to generate random store URLs and verify that
//! the addressing invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{compute_work_dir, path_hash};
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn base() -> PathBuf {
        PathBuf::from("/var/lib/appstore")
    }

    proptest! {
        /// Property: the hash segment is always 32 lowercase hex characters
        #[test]
        fn path_hash_is_lowercase_hex(input in ".*") {
            let hash = path_hash(&input);
            prop_assert_eq!(hash.len(), 32);
            prop_assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        }

        /// Property: http and https variants of a URL share a work directory
        #[test]
        fn work_dir_is_scheme_independent(
            host in "[a-z][a-z0-9]{0,10}\\.(com|org|io)",
            path in "(/[a-zA-Z0-9_-]{1,8}){0,5}",
        ) {
            let http = compute_work_dir(&base(), &format!("http://{}{}", host, path)).unwrap();
            let https = compute_work_dir(&base(), &format!("https://{}{}", host, path)).unwrap();
            prop_assert_eq!(http, https);
        }

        /// Property: the query string never affects the work directory
        #[test]
        fn work_dir_ignores_query(
            path in "(/[a-z0-9]{1,8}){1,4}",
            query in "[a-z]{1,5}=[a-z0-9]{0,5}",
        ) {
            let plain = compute_work_dir(&base(), &format!("https://example.com{}", path)).unwrap();
            let queried = compute_work_dir(&base(), &format!("https://example.com{}?{}", path, query)).unwrap();
            prop_assert_eq!(plain, queried);
        }

        /// Property: the work directory is base/host/hash, with the host literal
        #[test]
        fn work_dir_layout(
            host in "[a-z][a-z0-9]{0,10}\\.(com|org|io)",
            port in 1024u16..65535,
            path in "(/[a-z0-9]{1,8}){0,4}",
        ) {
            let work_dir = compute_work_dir(&base(), &format!("https://{}:{}{}", host, port, path)).unwrap();
            prop_assert_eq!(work_dir.parent().unwrap(), base().join(format!("{}:{}", host, port)));
            prop_assert!(work_dir.starts_with(base()));
        }

        /// Property: different paths give different work directories
        #[test]
        fn work_dir_distinguishes_paths(
            a in "(/[a-z0-9]{1,8}){1,4}",
            b in "(/[a-z0-9]{1,8}){1,4}",
        ) {
            prop_assume!(a != b);
            let wa = compute_work_dir(&base(), &format!("https://example.com{}", a)).unwrap();
            let wb = compute_work_dir(&base(), &format!("https://example.com{}", b)).unwrap();
            prop_assert_ne!(wa, wb);
        }
    }
}
