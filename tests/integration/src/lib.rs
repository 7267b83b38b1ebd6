//! Integration test crate for the Realmgate workspace; see `tests/`.
