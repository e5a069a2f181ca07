//! PaperSkill - Course Access and Payment Reconciliation
//!
//! This crate decides who may view or edit course content and turns a
//! processor-confirmed payment into a durable course grant, exactly once.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
