//! Integration tests entry point for the transaction inspector
//!
//! Lets Rust's test framework discover the tests in the integration
//! subdirectory.

mod integration;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integration_tests_module_loads() {
        integration::init_test_env();
    }
}
