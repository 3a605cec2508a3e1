// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod ids;
pub mod insights;
pub mod model;
pub mod records;
pub mod screens;
pub mod state;

pub use ids::*;
pub use insights::*;
pub use model::*;
pub use screens::*;
pub use state::*;
