//! Core library for FitCraft: AI-assisted workout plan generation and
//! exercise catalog reconciliation.
//!
//! ```text
//! prompt --> gateway (model call) --> GeneratedPlan
//!                                         |
//!                catalog ------------> reconcile --> EditSession --> Ficha
//! ```

pub mod catalog;
pub mod gateway;
pub mod model;
pub mod plan;
pub mod reconcile;
pub mod session;
