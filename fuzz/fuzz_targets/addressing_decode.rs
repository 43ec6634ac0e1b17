//! Fuzz target for the private-addressing parser
//!
//! # Invariants
//!
//! - `decode` never panics, whatever the field holds
//! - A broadcast keeps the field verbatim
//! - The body is always a suffix of the field
//! - Retargeting a field and decoding it yields the new target and the
//!   same body as retargeting the field once more

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_client::{addressing, Route};

#[derive(Debug, Arbitrary)]
struct Input {
    field: String,
    target: String,
}

fuzz_target!(|input: Input| {
    let addressed = addressing::decode(&input.field);

    match &addressed.route {
        Route::Broadcast if !input.field.contains(addressing::PRIVATE_TAG) => {
            assert_eq!(addressed.body, input.field);
        },
        Route::Broadcast => {},
        Route::Private(target) => {
            assert!(!target.is_empty());
            assert!(!target.contains(' ') && !target.contains(':'));
        },
    }
    assert!(input.field.ends_with(&addressed.body));

    // Targets picked from the user list never hold spaces or colons
    if input.target.is_empty() || input.target.contains([' ', ':']) {
        return;
    }

    let once = addressing::retarget(&input.field, &input.target);
    let decoded = addressing::decode(&once);
    assert_eq!(decoded.route, Route::Private(input.target.clone()));

    let twice = addressing::retarget(&once, &input.target);
    assert_eq!(twice, once);
});
