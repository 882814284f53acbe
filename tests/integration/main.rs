//! Integration tests driving the HTTP API with in-memory collaborators.

mod auth_test;
mod consumer_test;
mod helpers;
