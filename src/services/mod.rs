// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod downloader;
pub mod graph;
pub mod paging;
pub mod poller;
pub mod signon;

pub use downloader::UserDownloader;
pub use graph::GraphClient;
pub use paging::fetch_all;
pub use poller::{PollLoop, PollState, UserOutcome};
pub use signon::{SignOnResult, SignOnService};
