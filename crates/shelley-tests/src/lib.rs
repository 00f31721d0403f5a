//! Integration test suite for the Shelley transaction pipeline.
//!
//! Drives the wallet end to end, from UTXO selection through signing, and
//! checks the pipeline's accounting and authorization invariants under
//! generated inputs.

pub mod helpers;
