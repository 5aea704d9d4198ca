//! HTTP request handlers

pub mod calls;
pub mod health;
