//! `SeaORM` entities for the todolist schema.

pub mod task;
