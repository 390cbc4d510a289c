//! Unit tests for the task module.

mod memory_repository_tests;
