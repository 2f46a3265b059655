//! Kani harnesses for chunk length arithmetic.

use super::{FRAMING_OVERHEAD, joined_len, wrapped_len};

#[kani::proof]
fn kani_single_element_join_equals_wrap() {
    let len: usize = kani::any();
    kani::assume(len <= usize::MAX - FRAMING_OVERHEAD);

    kani::assert(
        joined_len([len]) == wrapped_len(len),
        "one-element join is the wrapped length",
    );
}

#[kani::proof]
fn kani_pair_join_adds_one_separator() {
    let a: u16 = kani::any();
    let b: u16 = kani::any();

    let joined = joined_len([usize::from(a), usize::from(b)]);

    kani::assert(
        joined == Some(usize::from(a) + usize::from(b) + FRAMING_OVERHEAD + 1),
        "two elements need brackets plus one comma",
    );
}
