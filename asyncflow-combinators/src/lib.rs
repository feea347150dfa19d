// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Transformation combinators built strictly atop `Future`/`Channel`'s
//! subscribe-based push model: the *mechanism* combinators use, not every
//! named combinator a full reactive library might offer.

mod debounce;
mod distinct;
mod filter;
mod flat_map;
mod map;
mod merge;
mod zip;

pub use debounce::ChannelDebounceExt;
pub use distinct::ChannelDistinctExt;
pub use filter::ChannelFilterExt;
pub use flat_map::FutureFlatMapExt;
pub use map::{ChannelMapExt, FutureMapExt};
pub use merge::merge;
pub use zip::zip;
