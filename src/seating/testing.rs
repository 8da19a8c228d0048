//! Fixtures shared by the seating tests.

use super::types::Unit;

/// Unit keyed by `first.last@example.com`.
pub fn unit(first: &str, last: &str, size: u32) -> Unit {
    let email = format!("{}.{}@example.com", first, last).to_lowercase();
    Unit::new(email, first, last, size)
}

/// Unit named only by its last name, for graph and packing tests.
pub fn family(last: &str, size: u32) -> Unit {
    unit("", last, size)
}
