//! Test suite for the prompt builder
//!
//! This module organizes tests into logical groups: the kind registry and
//! block lifecycle, documents and their persisted shapes, end-to-end flows,
//! and property-based invariants.

#[cfg(test)]
mod document_tests;
