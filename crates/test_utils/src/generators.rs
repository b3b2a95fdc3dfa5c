//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_intake::evidence::{MIME_JPEG, MIME_MP4, MIME_PDF, MIME_PNG};
use domain_intake::CandidateFile;

use crate::fixtures::MB;

/// An operation on a field array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayOp {
    Append,
    /// Index is reduced modulo the current length when applied
    Remove(usize),
}

/// Strategy for sequences of append/remove operations
pub fn array_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<ArrayOp>> {
    prop::collection::vec(
        prop_oneof![
            3 => Just(ArrayOp::Append),
            1 => (0usize..16).prop_map(ArrayOp::Remove),
        ],
        0..max_len,
    )
}

/// Strategy for links the URL rule accepts
pub fn valid_url_strategy() -> impl Strategy<Value = String> {
    (prop_oneof![Just("http"), Just("https")], "[a-z]{1,12}", "[a-z]{2,3}", "[a-z0-9/]{0,16}")
        .prop_map(|(scheme, host, tld, path)| format!("{}://{}.{}/{}", scheme, host, tld, path))
}

/// Strategy for text the URL rule rejects
pub fn invalid_url_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}\\.[a-z]{2,3}(/[a-z]{0,8})?"
        .prop_filter("must not start with a scheme", |s| !s.starts_with("http"))
}

/// Strategy for MIME types the wizard understands
pub fn known_mime_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(MIME_JPEG), Just(MIME_PNG), Just(MIME_PDF), Just(MIME_MP4)]
}

/// Strategy for candidate files up to twice the default size cap
pub fn candidate_file_strategy() -> impl Strategy<Value = CandidateFile> {
    (known_mime_strategy(), 0u64..=10 * MB)
        .prop_map(|(mime, size)| CandidateFile::new("generated", mime, size))
}

/// Strategy for decimals with two places in `-10_000.00..10_000.00`
pub fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}
