use crate::{filter::FilterNode, foundation::error::FfgraphResult};

/// Ordered filter chains that become the single value of `-filter_complex`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: FilterNode) {
        self.nodes.push(node);
    }

    pub fn with(mut self, node: FilterNode) -> Self {
        self.push(node);
        self
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = FilterNode>) {
        self.nodes.extend(nodes);
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<FilterNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validates every node in order (fail-fast) and joins the chains with `;`.
    pub fn validate_and_render(&self) -> FfgraphResult<String> {
        let mut chains = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            node.validate()?;
            chains.push(node.render());
        }
        Ok(chains.join(";"))
    }
}

impl FromIterator<FilterNode> for FilterGraph {
    fn from_iter<T: IntoIterator<Item = FilterNode>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_k_chains_with_k_minus_one_separators() {
        let graph: FilterGraph = [
            FilterNode::split_numbered("0:v", 2),
            FilterNode::scale("1", "small", 640, -2),
            FilterNode::rotate("2", "turned", crate::filter::TransposeMode::CounterClockwise),
        ]
        .into_iter()
        .collect();

        let rendered = graph.validate_and_render().unwrap();
        assert_eq!(rendered.matches(';').count(), graph.len() - 1);
        assert_eq!(
            rendered,
            "[0:v]split=2[1][2];[1]scale=640:-2[small];[2]transpose=2[turned]"
        );
    }

    #[test]
    fn single_node_has_no_separator() {
        let graph = FilterGraph::new().with(FilterNode::raw("hflip"));
        assert_eq!(graph.validate_and_render().unwrap(), "hflip");
    }

    #[test]
    fn invalid_node_aborts_whole_graph() {
        let graph = FilterGraph::new()
            .with(FilterNode::raw("hflip"))
            .with(FilterNode::crop("a", "b", 0, 10, 0, 0))
            .with(FilterNode::raw(""));
        let err = graph.validate_and_render().unwrap_err();
        assert!(err.to_string().contains("crop:"), "{err}");
    }
}
