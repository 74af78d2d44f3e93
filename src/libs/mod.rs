pub mod block;
pub mod config;
pub mod continuity;
pub mod error;
pub mod io;
pub mod merge;
pub mod split;
pub mod stream;
pub mod trim;
pub mod writer;
