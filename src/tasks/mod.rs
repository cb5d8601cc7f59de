//! Background Tasks Module
//!
//! Contains background tasks owned by a cache instance.
//!
//! # Tasks
//! - Sweeper: Removes expired entries from every bucket at a fixed interval

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;
