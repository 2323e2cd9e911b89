//! drop-search: cache-aside aggregation services for game drop data
//!
//! Three small HTTP services built from the same crate:
//!
//! - **search-aggregator**: fans out to the name resolver, drop repo, and
//!   image retriever, merges their results, and fronts the whole thing with
//!   a Redis cache-aside layer.
//! - **drop-repo**: CRUD and batch existence checks over the relational
//!   drop table.
//! - **image-retriever**: cache-fronted image fetch and batch existence
//!   probes against S3-compatible object storage.

pub mod cache;
pub mod clients;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod web;
