//! `trellis.toml` configuration

mod model;

pub use model::{Config, EvaluationPolicy, RenderConfig, CONFIG_FILE_NAME};
