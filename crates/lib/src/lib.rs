//! craftfleet-lib: reconciliation engine for a fleet of game-server installs.
//!
//! This crate provides the pieces that bring one server directory in line with
//! its desired state:
//! - `catalog`: resolves version references against the remote version catalog
//! - `artifact`: keeps the server binary matching the catalog's SHA-1
//! - `identity`: best-effort account name to UUID lookup
//! - `state`: diff-and-merge of the per-server state files
//! - `provision`: the per-server pipeline tying the above together
//! - `fleet`: bounded parallel provisioning of every configured server

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod fetch;
pub mod fleet;
pub mod identity;
pub mod provision;
pub mod state;

#[cfg(test)]
pub mod testutil;
