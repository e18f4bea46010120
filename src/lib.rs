//! # Notification Service Core
//!
//! Storage access layer and create-and-dispatch orchestration for user
//! notifications. Records live in a single DynamoDB table keyed per user,
//! dispatch messages are handed off to SQS for asynchronous delivery by an
//! external worker.

pub mod bootstrap;
pub mod channels;
pub mod config;
pub mod consts;
pub mod errors;
pub mod logger;
pub mod models;
pub mod repo;
pub mod service;
pub mod services;
