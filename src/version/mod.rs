//! Version layer: normalization and manifest resolution
//!
//! Turns a requested tor version into download metadata for the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Normalize  │────▶│  Resolver   │────▶│ InstallInfo │
//! │ (to semver) │     │ (first file)│     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                        │       │
//!                        ▼       ▼
//!              ┌─────────────┐ ┌─────────────┐
//!              │  Registry   │ │   Matcher   │
//!              │  (fetch)    │ │(range, host)│
//!              └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`normalize`]: Upstream version syntax to semantic versions
//! - [`resolver`]: Manifest fetch + match into [`types::InstallInfo`]
//! - [`registry`]: Trait for fetching the versions manifest
//! - [`registries`]: Concrete manifest sources (GitHub)
//! - [`matcher`]: Trait for picking a release from the manifest
//! - [`matchers`]: Concrete matchers (versions manifest)
//! - [`range`]: node-style version range satisfaction
//! - [`semver`]: Lenient parsing and coercion helpers
//! - [`error`]: Error types for manifest operations
//! - [`types`]: Manifest and resolution types

pub mod error;
pub mod matcher;
pub mod matchers;
pub mod normalize;
pub mod range;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod types;
