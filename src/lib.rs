//! DevLog - automated engineering journal
//!
//! Records learnings for spaced review, collects shell history and git
//! commit subjects, summarizes each day into markdown and publishes it
//! to a git repository.

pub mod capture;
pub mod config;
pub mod git;
pub mod publish;
pub mod storage;
pub mod summarize;
pub mod sync;
