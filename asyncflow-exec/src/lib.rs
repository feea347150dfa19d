// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]
#[macro_use]
mod logging;
mod future_after;
mod task;

pub use future_after::{future_after, future_after_value};
pub use task::AsyncFlowTask;
