//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, blockchain RPC). Each
//! sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: wallet connection and protocol bindings via alloy-rs
//! - `metrics`: Prometheus metrics export and health checks
//! - `relayer`: Standard Relayer API v2 client

pub mod chain;
pub mod metrics;
pub mod relayer;
