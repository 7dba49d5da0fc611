// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Logger configuration and lifecycle

mod config;
mod controller;

pub use config::{Config, ConfigHandle, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_RECORDS};
pub use controller::{LifecycleState, NetLogger, OverlayPresenter};
