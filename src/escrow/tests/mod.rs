//! Unit tests for the escrow module.
