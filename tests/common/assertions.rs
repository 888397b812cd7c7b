//! Custom test assertions for search results

#![allow(dead_code)]

use std::collections::HashSet;

use findex_index::{IndexError, Location};

/// Assert that a search returned exactly `expected`
pub fn assert_locations(actual: &HashSet<Location>, expected: &[&str]) {
    let expected: HashSet<Location> = expected.iter().map(|n| Location::from(*n)).collect();
    assert_eq!(
        actual, &expected,
        "search returned {:?}, expected {:?}",
        actual, expected
    );
}

/// Assert that no returned location still carries a discriminator byte
pub fn assert_no_discriminator(actual: &HashSet<Location>) {
    for location in actual {
        let first = location.as_bytes().first().copied();
        assert!(
            first != Some(b'l') && first != Some(b'w'),
            "location {:?} looks tagged",
            location
        );
    }
}

/// Assert that an error came from the storage backend
pub fn assert_backend_failure(err: &IndexError) {
    assert!(err.is_backend(), "expected a backend failure, got {:?}", err);
}
