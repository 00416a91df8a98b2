//! Domain model module declarations.

pub mod ident;
pub mod report;
pub mod task;
pub mod worker;
