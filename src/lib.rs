//! ffgraph builds ffmpeg command lines from typed parts and parses ffmpeg's live
//! `-progress` output.
//!
//! - Compose global options ([`OptionSet`]), a filter graph ([`FilterGraph`]) and
//!   outputs ([`OutputSpec`]) into a [`CommandModel`]
//! - [`CommandModel::render`] validates every unit and produces the argv
//! - Feed the child's progress stream to [`progress::feed`] or a [`ProgressParser`]
//! - Or hand the whole thing to a [`Runner`]
#![forbid(unsafe_code)]

mod foundation;

pub mod builder;
pub mod command;
pub mod filter;
pub mod flags;
pub mod graph;
pub mod options;
pub mod output;
pub mod presets;
pub mod progress;
pub mod runner;

pub use crate::builder::{FilterGraphBuilder, OptionsBuilder, OutputBuilder};
pub use crate::command::CommandModel;
pub use crate::filter::{FilterNode, ScaleMode, TransposeMode};
pub use crate::flags::FlagUnit;
pub use crate::foundation::error::{FfgraphError, FfgraphResult};
pub use crate::graph::FilterGraph;
pub use crate::options::OptionSet;
pub use crate::output::OutputSpec;
pub use crate::progress::{Progress, ProgressParser};
pub use crate::runner::{
    CommandLauncher, ProgressStream, Runner, RunnerConfig, SystemLauncher, is_binary_available,
};
