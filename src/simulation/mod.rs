//! Batch and stress-testing utilities built on top of the scenario layer.

pub mod stress_test;
