// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod artifact;
pub mod metadata;
pub mod user;

pub use artifact::{artifact_key, Artifact};
pub use metadata::{MetadataDescriptor, MetadataResponse};
pub use user::{AccessCredential, DeniedSignOn, GraphUser, UserRecord};
