//! Unit tests for the wallet module.
