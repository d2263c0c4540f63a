/// State management module
///
/// This module handles the roster state, including:
/// - Database connection and queries (roster.rs)
/// - Shared data structures (data.rs)
/// - Reading mess lists from CSV (csv.rs)

pub mod csv;
pub mod data;
pub mod roster;
