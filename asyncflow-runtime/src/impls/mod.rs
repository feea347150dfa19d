// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod async_std;
mod common;
pub mod embassy;
pub mod smol;
pub mod tokio;
pub mod wasm;
