//! # Gazette
//!
//! A country-scoped top-headline reader: fetch, cache, search, favorite.
//!
//! ## Architecture
//!
//! ```text
//! NewsSource → Repository → Store
//!                  ↓
//!            NewsViewModel → CLI
//! ```
//!
//! The repository is the sole mediator between the remote API, the SQLite
//! cache, and the preference store. Reads are exposed as live queries
//! ([`live::LiveQuery`]) that re-emit whenever the store changes; the view
//! model projects them, plus transient UI state, into atomic [`domain::ViewState`]
//! snapshots on a watch channel.
//!
//! ## Modules
//!
//! - [`app`]: composition root ([`app::AppContext`]) and error types
//! - [`cli`]: clap command definitions and handlers
//! - [`config`]: TOML configuration file
//! - [`domain`]: `Article`, `FavoriteArticle`, `ViewState`
//! - [`live`]: revision-channel live-query abstraction
//! - [`prefs`]: durable grid-layout preference with a live view
//! - [`remote`]: news API trait and reqwest client
//! - [`repository`]: unified read/write API over all collaborators
//! - [`store`]: SQLite persistence
//! - [`viewmodel`]: view state holder

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod live;
pub mod prefs;
pub mod remote;
pub mod repository;
pub mod store;
pub mod viewmodel;
