//! Benchmark configuration layering for the command line.
//!
//! Values are resolved with the precedence CLI flags > `-S key=value` overrides > TOML file >
//! built-in defaults, then validated by the core `BenchmarkConfigBuilder`.

mod builder;
mod defaults;
mod file;

pub use builder::build_config;
