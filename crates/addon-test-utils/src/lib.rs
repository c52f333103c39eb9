//! Shared test utilities for the addon version checker workspace.
//!
//! This crate provides on-disk package fixtures so crate test suites do not
//! each hand-roll `node_modules` trees. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`manifest`]: single `package.json` writers, well-formed and broken
//! - [`project`]: [`FixtureProject`] builder for nested installs plus the
//!   matching addon tree

pub mod manifest;
pub mod project;

pub use project::FixtureProject;
