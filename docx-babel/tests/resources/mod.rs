//! Deferred resource resolution and write-back.

mod pipeline;
mod resolver;
mod stubs;
