use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Error;
use crate::graph::{DiGraph, NodeId};
use crate::options::{Direction, LevelOptions, Strategy};
use crate::result::LayoutResult;

/// Name-resolved view of a [`LayoutResult`] for printing.
#[derive(Debug, Clone, Serialize)]
pub struct LevelReport {
    pub direction: Direction,
    pub strategy: Strategy,
    pub number_of_levels: usize,
    pub nodes_per_level: Vec<usize>,
    pub levels: Vec<Vec<String>>,
    pub isolated: Vec<String>,
    pub cycle_groups: Vec<Vec<String>>,
}

impl LevelReport {
    pub fn new(graph: &DiGraph<String>, result: &LayoutResult<NodeId>, options: LevelOptions) -> Self {
        let name = |id: &NodeId| graph.node(*id).clone();

        Self {
            direction: options.direction,
            strategy: options.strategy,
            number_of_levels: result.number_of_levels(),
            nodes_per_level: result.nodes_per_level().to_vec(),
            levels: result
                .layers()
                .iter()
                .map(|layer| layer.iter().map(name).collect())
                .collect(),
            isolated: result
                .iter()
                .filter(|(id, _)| result.is_isolated(id))
                .map(|(id, _)| name(&id))
                .collect(),
            cycle_groups: result
                .cycle_groups()
                .iter()
                .map(|group| group.iter().map(name).collect())
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "levels: {}", self.number_of_levels);
        for (level, nodes) in self.levels.iter().enumerate() {
            let _ = writeln!(out, "  {}: {}", level, nodes.join(" "));
        }
        if !self.isolated.is_empty() {
            let _ = writeln!(out, "isolated: {}", self.isolated.join(" "));
        }
        for group in &self.cycle_groups {
            let _ = writeln!(out, "cycle: {}", group.join(" "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::assign_levels;
    use crate::parser::parse_graph;

    fn report(input: &str) -> LevelReport {
        let graph = parse_graph(input).unwrap();
        let result = assign_levels(&graph);
        LevelReport::new(&graph, &result, LevelOptions::default())
    }

    #[test]
    fn text_lists_levels_isolated_and_cycles() {
        let text = report("a --> b\nb --> a\nb --> c\nx\n").to_text();
        assert_eq!(
            text,
            "levels: 3\n  0: x\n  1: a b\n  2: c\nisolated: x\ncycle: a b\n"
        );
    }

    #[test]
    fn json_carries_names() {
        let json = report("a --> b").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["number_of_levels"], 2);
        assert_eq!(value["levels"][1][0], "b");
        assert_eq!(value["direction"], "forward");
        assert_eq!(value["strategy"], "incremental");
    }
}
