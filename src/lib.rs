//! Scrapes product listings from a Telegram channel into a storefront data
//! file.
//!
//! The pipeline reads posts from a [`source::MessageSource`], turns each post
//! into a listing with [`extract::extract_listing`], numbers and enriches the
//! kept listings in [`batch::run_batch`], and writes them out with
//! [`sink::write_products`].

pub mod batch;
pub mod catalog;
pub mod config;
pub mod db;
pub mod extract;
pub mod ingest;
pub mod media;
pub mod model;
pub mod notify;
pub mod sink;
pub mod source;
