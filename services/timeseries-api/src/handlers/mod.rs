//! HTTP request handlers for the time-series API.

pub mod download;
pub mod health;
pub mod index;
pub mod timeseries;
pub mod upload;
