use crate::error::Error;
use crate::graph::DiGraph;

// Longest first so `-.->` is not read as `->`.
const ARROWS: [&str; 4] = ["-.->", "==>", "-->", "->"];

/// Parse a flowchart-style edge list into a graph.
///
/// ```text
/// graph TD
///     %% comments are skipped
///     a --> b --> c
///     b -->|retry| a
///     orphan
/// ```
///
/// A leading `graph`/`flowchart` header is accepted and ignored. Node
/// decorations such as `a[Label]` reduce to the bare id. Nodes are numbered in
/// first-seen order, which later decides tie-breaking in the level assigner.
pub fn parse_graph(input: &str) -> Result<DiGraph<String>, Error> {
    let mut graph = DiGraph::new();
    let mut seen_content = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim().trim_end_matches(';').trim_end();
        if line.is_empty() || line.starts_with("%%") {
            continue;
        }
        if !seen_content {
            seen_content = true;
            if is_header(line) {
                continue;
            }
        }

        let parts = split_chain(line);
        let mut previous: Option<String> = None;
        for (pos, part) in parts.iter().enumerate() {
            let part = if pos == 0 {
                part.trim()
            } else {
                strip_edge_label(part, line_no)?
            };
            let id = extract_node_id(part).ok_or_else(|| {
                if part.is_empty() {
                    Error::parse(line_no, "arrow is missing a node on one side")
                } else {
                    Error::parse(line_no, format!("'{}' is not a valid node id", part))
                }
            })?;

            match previous.take() {
                Some(from) => {
                    graph.add_edge(from, id.clone());
                }
                None => {
                    graph.add_node(id.clone());
                }
            }
            previous = Some(id);
        }
    }

    Ok(graph)
}

fn is_header(line: &str) -> bool {
    let mut words = line.split_whitespace();
    let keyword = words.next().unwrap_or("").to_ascii_lowercase();
    (keyword == "graph" || keyword == "flowchart") && words.count() <= 1
}

/// Split `a --> b --> c` on arrows that sit outside node decorations.
fn split_chain(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'(' | b'{' => depth += 1,
            b']' | b')' | b'}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if let Some(arrow) = ARROWS.iter().find(|a| bytes[i..].starts_with(a.as_bytes())) {
                    parts.push(&line[start..i]);
                    i += arrow.len();
                    start = i;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    parts.push(&line[start..]);
    parts
}

/// Drop a `|label|` directly after an arrow.
fn strip_edge_label(part: &str, line_no: usize) -> Result<&str, Error> {
    let part = part.trim();
    match part.strip_prefix('|') {
        Some(rest) => match rest.find('|') {
            Some(end) => Ok(rest[end + 1..].trim()),
            None => Err(Error::parse(line_no, "unterminated edge label")),
        },
        None => Ok(part),
    }
}

fn extract_node_id(part: &str) -> Option<String> {
    let id = match part.find(['[', '(', '{']) {
        Some(pos) => part[..pos].trim(),
        None => part,
    };

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
    valid.then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphView;

    fn names(graph: &DiGraph<String>) -> Vec<&str> {
        graph.vertices().map(|id| graph.node(id).as_str()).collect()
    }

    #[test]
    fn parses_chains_and_lone_nodes() {
        let input = r#"
graph TD
    %% comment
    a --> b --> c
    x
"#;
        let graph = parse_graph(input).unwrap();
        assert_eq!(names(&graph), vec!["a", "b", "c", "x"]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn strips_decorations_and_labels() {
        let input = "flowchart LR\nA[Start here] -->|yes| B{Done?}\nB -.-> C((End));\nC ==> A\n";
        let graph = parse_graph(input).unwrap();
        assert_eq!(names(&graph), vec!["A", "B", "C"]);
        let edges: Vec<(&str, &str)> = graph
            .edges()
            .map(|(from, to)| (graph.node(from).as_str(), graph.node(to).as_str()))
            .collect();
        assert_eq!(edges, vec![("A", "B"), ("B", "C"), ("C", "A")]);
    }

    #[test]
    fn arrows_inside_labels_are_ignored() {
        let graph = parse_graph("a[x --> y] -> b").unwrap();
        assert_eq!(names(&graph), vec!["a", "b"]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn header_only_counts_on_first_line() {
        let graph = parse_graph("a -> b\ngraph\n").unwrap();
        assert_eq!(names(&graph), vec!["a", "b", "graph"]);
    }

    #[test]
    fn missing_endpoint_reports_line() {
        let err = parse_graph("graph TD\na -->\n").unwrap_err();
        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unterminated_label_is_an_error() {
        assert!(parse_graph("a -->|oops b").is_err());
    }

    #[test]
    fn rejects_garbage_ids() {
        let err = parse_graph("a b --> c").unwrap_err();
        assert!(err.to_string().contains("not a valid node id"));
    }
}
