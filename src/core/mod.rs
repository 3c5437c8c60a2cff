//! Core business logic - framework-agnostic asset, maintenance and audit operations.
//!
//! `scheduler` and `history` are pure; the remaining modules persist through `SeaORM`
//! and call into them.

/// Asset CRUD that records audit entries
pub mod asset;
/// Audit entry persistence and history lookup
pub mod audit;
/// Changed-field computation, value formatting and audit rendering
pub mod history;
/// Maintenance item editing, calendar and overdue sweep
pub mod maintenance;
/// Summaries and plain-text exports
pub mod report;
/// Next maintenance date projection and status classification
pub mod scheduler;
/// Recent searches behind an injected store
pub mod search_history;
