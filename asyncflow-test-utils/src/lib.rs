// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]

pub mod animal;
pub mod helpers;
pub mod person;
pub mod plant;
pub mod test_executor;

pub use helpers::{assert_no_event_recorded, wait_until, EventRecorder, RecordedEvent};
pub use test_executor::RecordingExecutor;
