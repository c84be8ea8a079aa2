// src/lib.rs

//! internscout: watches job boards for new internship postings.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;
