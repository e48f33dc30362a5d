//! Classifies a learning tree's skills into progress tiers and resolves
//! one-click jump targets for the first skill of each tier.
//!
//! The core lives in [`engine`] (classification and target resolution),
//! [`session`] (menu surface, click wiring, page lifecycle) and [`store`]
//! (per-language-pair persisted context). The remaining modules make up the
//! terminal host used by the `leveljumper` binary.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;
