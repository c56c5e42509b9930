//! Request middleware for murimi-api.

pub mod auth;
