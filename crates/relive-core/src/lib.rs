//! relive-core - Core library for ReLive
//!
//! Entry models, media synchronization, and the storage clients behind the
//! ReLive journal: entry metadata lives in Firestore, photos and voice notes
//! in Supabase Storage.

pub mod auth;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod models;
pub mod search;
pub mod services;
pub mod storage;
pub mod sync;
mod util;

pub use error::{Error, Result};
pub use models::{DateKey, EntryRecord, EntryState, MediaRef, Mood};
