//! Fluent builders that record construction steps and apply them in call order
//! when `build()` is called.

use crate::{
    command::CommandModel,
    filter::{FilterNode, ScaleMode},
    flags::FlagUnit,
    graph::FilterGraph,
    options::OptionSet,
    output::OutputSpec,
};

type Step<T> = Box<dyn FnOnce(&mut T) + Send>;

#[derive(Default)]
pub struct OptionsBuilder {
    steps: Vec<Step<OptionSet>>,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary step.
    pub fn with(mut self, step: impl FnOnce(&mut OptionSet) + Send + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn flag(self, flag: FlagUnit) -> Self {
        self.with(move |set| set.push(flag))
    }

    pub fn input<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.flag(FlagUnit::input(paths))
    }

    pub fn overwrite(self) -> Self {
        self.flag(FlagUnit::Overwrite)
    }

    pub fn log_level(self, level: impl Into<String>) -> Self {
        self.flag(FlagUnit::log_level(level))
    }

    pub fn progress(self, target: impl Into<String>) -> Self {
        self.flag(FlagUnit::progress_sink(target))
    }

    pub fn build(self) -> OptionSet {
        let mut set = OptionSet::new();
        for step in self.steps {
            step(&mut set);
        }
        set
    }
}

#[derive(Default)]
pub struct FilterGraphBuilder {
    steps: Vec<Step<FilterGraph>>,
}

impl FilterGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, step: impl FnOnce(&mut FilterGraph) + Send + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn node(self, node: FilterNode) -> Self {
        self.with(move |graph| graph.push(node))
    }

    pub fn nodes(self, nodes: impl IntoIterator<Item = FilterNode> + Send + 'static) -> Self {
        self.with(move |graph| graph.extend(nodes))
    }

    /// Raw expression with surrounding whitespace removed, e.g. `scale=1280:-2`.
    pub fn expr(self, expr: &str) -> Self {
        self.node(FilterNode::raw(expr.trim()))
    }

    /// `[input]expr[output]`; blank labels are omitted.
    pub fn chain(self, input: &str, expr: &str, output: &str) -> Self {
        self.node(FilterNode::chain(input, expr, output))
    }

    pub fn scale(self, input: &str, output: &str, width: i32, height: i32) -> Self {
        self.node(FilterNode::scale(input.trim(), output.trim(), width, height))
    }

    pub fn scale_preset(self, input: &str, output: &str, mode: ScaleMode) -> Self {
        self.node(FilterNode::scale_preset(input.trim(), output.trim(), mode))
    }

    pub fn crop(
        self,
        input: &str,
        output: &str,
        width: i32,
        height: i32,
        x: i32,
        y: i32,
    ) -> Self {
        self.node(FilterNode::crop(
            input.trim(),
            output.trim(),
            width,
            height,
            x,
            y,
        ))
    }

    pub fn rotate(self, input: &str, output: &str, mode: impl Into<i32>) -> Self {
        self.node(FilterNode::rotate(input.trim(), output.trim(), mode))
    }

    /// Split into `n` streams with the given labels. A label count that differs
    /// from `n` is reported when the graph is rendered.
    pub fn split<O, T>(self, input: &str, n: i32, outputs: O) -> Self
    where
        O: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let outputs = outputs
            .into_iter()
            .map(|o| o.as_ref().trim().to_string())
            .collect::<Vec<_>>();
        self.node(FilterNode::split(input.trim(), n, outputs))
    }

    /// Split into `n` streams labelled `1..=n`.
    pub fn split_numbered(self, input: &str, n: i32) -> Self {
        self.node(FilterNode::split_numbered(input.trim(), n))
    }

    pub fn build(self) -> FilterGraph {
        let mut graph = FilterGraph::new();
        for step in self.steps {
            step(&mut graph);
        }
        graph
    }

    /// Appends the built nodes to `cmd`'s existing graph.
    pub fn apply(self, mut cmd: CommandModel) -> CommandModel {
        cmd.graph.extend(self.build().into_nodes());
        cmd
    }
}

#[derive(Default)]
pub struct OutputBuilder {
    steps: Vec<Step<OutputSpec>>,
    file: Option<String>,
}

impl OutputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, step: impl FnOnce(&mut OutputSpec) + Send + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends a flag, e.g. one of the [`crate::presets`].
    pub fn flag(self, flag: FlagUnit) -> Self {
        self.with(move |out| out.push(flag))
    }

    /// Sets the output path. It is always placed after every other flag; the
    /// last call wins.
    pub fn file(mut self, path: impl Into<String>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.flag(FlagUnit::video_codec(codec))
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.flag(FlagUnit::audio_codec(codec))
    }

    pub fn crf(self, crf: i32) -> Self {
        self.flag(FlagUnit::Crf(crf))
    }

    pub fn bitrate(self, rate: impl Into<String>) -> Self {
        self.flag(FlagUnit::bitrate(rate))
    }

    pub fn audio_bitrate(self, rate: impl Into<String>) -> Self {
        self.flag(FlagUnit::audio_bitrate(rate))
    }

    pub fn preset(self, name: impl Into<String>) -> Self {
        self.flag(FlagUnit::preset(name))
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.flag(FlagUnit::format(format))
    }

    pub fn sample_rate(self, hz: i32) -> Self {
        self.flag(FlagUnit::SampleRate(hz))
    }

    pub fn channels(self, n: i32) -> Self {
        self.flag(FlagUnit::Channels(n))
    }

    pub fn map(self, stream: impl Into<String>) -> Self {
        self.flag(FlagUnit::map(stream))
    }

    pub fn build(self) -> OutputSpec {
        let mut out = OutputSpec::new();
        for step in self.steps {
            step(&mut out);
        }
        if let Some(path) = self.file {
            out.push(FlagUnit::File(path));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter::TransposeMode, presets};

    #[test]
    fn options_builder_keeps_call_order() {
        let set = OptionsBuilder::new()
            .input(["a.mp4", "b.mp4"])
            .overwrite()
            .log_level("warning")
            .progress("pipe:2")
            .build();
        assert_eq!(
            set.validate_and_render().unwrap(),
            vec![
                "-i", "a.mp4", "-i", "b.mp4", "-y", "-loglevel", "warning", "-progress", "pipe:2"
            ]
        );
    }

    #[test]
    fn output_builder_puts_file_last() {
        let out = OutputBuilder::new()
            .file("first.mp4")
            .flag(presets::h264())
            .flag(presets::aac())
            .flag(presets::crf_good_quality())
            .flag(presets::medium())
            .file("output_basic.mp4")
            .build();
        assert_eq!(
            out.validate_and_render().unwrap(),
            vec![
                "-c:v",
                "libx264",
                "-c:a",
                "aac",
                "-crf",
                "23",
                "-preset",
                "medium",
                "output_basic.mp4"
            ]
        );
    }

    #[test]
    fn output_builder_without_file() {
        let out = OutputBuilder::new().format("null").build();
        assert_eq!(out.path(), None);
        assert_eq!(out.validate_and_render().unwrap(), vec!["-f", "null"]);
    }

    #[test]
    fn output_builder_typed_helpers() {
        let out = OutputBuilder::new()
            .video_codec("libx265")
            .bitrate("4M")
            .audio_codec("libopus")
            .audio_bitrate("96k")
            .sample_rate(48000)
            .channels(2)
            .map("[v]")
            .preset("slow")
            .crf(20)
            .file("o.mkv")
            .build();
        assert_eq!(out.len(), 10);
        assert_eq!(out.path(), Some("o.mkv"));
        assert!(out.validate_and_render().is_ok());
    }

    #[test]
    fn graph_builder_trims_labels() {
        let graph = FilterGraphBuilder::new()
            .crop(" 0:v ", "s1", 800, 600, 100, 50)
            .rotate("s1", " s2", TransposeMode::ROTATE_90)
            .scale("s2 ", "s3", 1280, 720)
            .expr("  null ")
            .build();
        assert_eq!(
            graph.validate_and_render().unwrap(),
            "[0:v]crop=800:600:100:50[s1];[s1]transpose=1[s2];[s2]scale=1280:720[s3];null"
        );
    }

    #[test]
    fn graph_builder_split_fan_out() {
        let graph = FilterGraphBuilder::new()
            .split_numbered("0:v", 3)
            .scale_preset("1", "480p", ScaleMode::Sd480)
            .scale_preset("2", "720p", ScaleMode::Hd)
            .scale_preset("3", "1080p", ScaleMode::Fhd)
            .build();
        assert_eq!(
            graph.validate_and_render().unwrap(),
            concat!(
                "[0:v]split=3[1][2][3];",
                "[1]scale=854:480[480p];",
                "[2]scale=1280:720[720p];",
                "[3]scale=1920:1080[1080p]"
            )
        );

        let mismatched = FilterGraphBuilder::new().split("0:v", 3, ["a", "b"]).build();
        assert!(mismatched.validate_and_render().is_err());
    }

    #[test]
    fn graph_builder_apply_appends_to_existing_graph() {
        let cmd = CommandModel::new().with_filter(FilterNode::raw("hflip"));
        let cmd = FilterGraphBuilder::new()
            .chain("", "vflip", "out")
            .with(|g| g.push(FilterNode::raw("null")))
            .apply(cmd);
        assert_eq!(
            cmd.graph.validate_and_render().unwrap(),
            "hflip;vflip[out];null"
        );
    }
}
