//! Concrete forms: a [`FormDefinition`](crate::controller::FormDefinition)
//! plus a success renderer for each endpoint.

pub mod account;
pub mod contact;
pub mod prediction;

#[cfg(test)]
#[path = "../tests/forms_tests.rs"]
mod tests;
