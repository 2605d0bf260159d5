use crate::{
    filter::FilterNode,
    flags::FlagUnit,
    foundation::error::FfgraphResult,
    graph::FilterGraph,
    options::OptionSet,
    output::OutputSpec,
};

/// A complete ffmpeg invocation: global options, an optional filter graph, and
/// outputs in append order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CommandModel {
    #[serde(default)]
    pub options: OptionSet,
    #[serde(default, skip_serializing_if = "FilterGraph::is_empty")]
    pub graph: FilterGraph,
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
}

impl CommandModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = options;
        self
    }

    pub fn with_graph(mut self, graph: FilterGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Appends one node to the current graph.
    pub fn with_filter(mut self, node: FilterNode) -> Self {
        self.graph.push(node);
        self
    }

    pub fn option(mut self, flag: FlagUnit) -> Self {
        self.options.push(flag);
        self
    }

    pub fn output(mut self, output: OutputSpec) -> Self {
        self.outputs.push(output);
        self
    }

    /// Paths of every output that ends with a `File` unit, in output order.
    pub fn output_paths(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().filter_map(OutputSpec::path)
    }

    /// Renders the full argv (without the program name).
    ///
    /// Order is fixed: global options, then `-filter_complex <graph>` when the
    /// graph has nodes, then each output. Any invalid unit fails the whole call.
    #[tracing::instrument(
        level = "debug",
        skip(self),
        fields(nodes = self.graph.len(), outputs = self.outputs.len())
    )]
    pub fn render(&self) -> FfgraphResult<Vec<String>> {
        let mut args = self.options.validate_and_render()?;

        if !self.graph.is_empty() {
            let graph = self.graph.validate_and_render()?;
            if !graph.is_empty() {
                args.push("-filter_complex".to_string());
                args.push(graph);
            }
        }

        for output in &self.outputs {
            args.extend(output.validate_and_render()?);
        }

        if self.outputs.is_empty() {
            tracing::debug!("command has no outputs");
        }
        tracing::debug!(tokens = args.len(), "rendered command");
        Ok(args)
    }
}
