//! Sync pipeline and documentation engine for docmirror.
//!
//! - [`Syncer`]: fetch the remote tree, detect changes against the last
//!   manifest, write changed files into the mirror, save the new manifest
//! - [`Docs`]: the engine request handlers talk to; owns the document cache,
//!   rebuilds it after every sync and serves [`Docs::get_document`]
//! - [`spawn_scheduler`]: background task running a sync cycle at startup
//!   (when stale) and on a fixed interval
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docmirror_config::Config;
//! use docmirror_remote::{GithubClient, GithubConfig};
//! use docmirror_sync::Docs;
//!
//! let config = Config::load(None, None)?;
//! let remote = Arc::new(GithubClient::new(GithubConfig::default()));
//! let docs = Arc::new(Docs::new(&config, remote));
//!
//! let scheduler = docs.initialize();
//! let page = docs.get_document("gitea", "intro", "en-US");
//! ```

mod cycle;
mod engine;
mod materialize;
mod scheduler;

pub use cycle::{AppSyncOutcome, AppSyncReport, SyncError, Syncer};
pub use engine::Docs;
pub use materialize::{MaterializeError, Materializer};
pub use scheduler::{SchedulerHandle, spawn_scheduler};
