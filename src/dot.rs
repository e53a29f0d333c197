//! You can export synthesized networks to the Graphviz dot format using [`LutNetwork::to_dot`].
//!
//! ```rust
//! use lutsynth::{RunConfig, Topology, synthesize};
//! use lutsynth::dot::GraphvizStyle;
//! use lutsynth::target::{NoHints, Parity};
//!
//! let config = RunConfig::new(Topology::new(2, 2, 1, 3, 1));
//! let report = synthesize(&config, &Parity, &NoHints).unwrap();
//! if let Some(network) = report.network() {
//!     println!("{}", network.to_dot(GraphvizStyle::default()));
//! }
//! ```
//!
//! You can then render the graphs using the DOT engine.

use std::{fmt::Display, ops::Add};

use crate::decode::{LutNetwork, Source};

// Default global style.
const DEFAULT_RANKDIR: &str = "BT";

// Default node styles.
const DEFAULT_INPUT_NODE_FORMAT: &str = "[shape=box]";
const DEFAULT_LUT_NODE_FORMAT: &str = "[shape=record]";
/// See https://stackoverflow.com/questions/50822798/how-to-use-graphviz-to-draw-a-node-pointed-by-an-arrow.
const DEFAULT_OUTPUT_NODE_FORMAT: &str = "[shape=none, height=.0, width=.0]";

// Default edge styles.
const DEFAULT_EDGE_ALL_FORMAT: &str = "[arrowsize=0.3]";
const DEFAULT_EDGE_INTERNAL_FORMAT: &str = "[style=\"dashed\"]";
const DEFAULT_EDGE_OUTPUT_FORMAT: &str = "[arrowhead=none]";

/// String containing the graphviz node style (you must manually include square brackets).
///
/// See [`GraphvizStyle`] for what kind of nodes can be described.
#[derive(Debug, Clone)]
pub struct GraphvizNodeStyle(String);

impl GraphvizNodeStyle {
    pub fn new(style: impl Into<String>) -> Self {
        GraphvizNodeStyle(style.into())
    }
}

impl Display for GraphvizNodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String containing the graphviz edge style (you must manually include square brackets).
///
/// See [`GraphvizStyle`] for what kind of edges can be described.
#[derive(Debug, Clone, Default)]
pub struct GraphvizEdgeStyle(String);

impl GraphvizEdgeStyle {
    pub fn new(style: impl Into<String>) -> Self {
        GraphvizEdgeStyle(style.into())
    }
}

impl Display for GraphvizEdgeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for GraphvizEdgeStyle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        GraphvizEdgeStyle(format!("{}{}", self.0, rhs.0))
    }
}

/// Parameters for Graphviz rendering.
///
/// ### Global parameters
/// - `rankdir`
///
/// ### Nodes
/// The following nodes can be rendered using [`GraphvizNodeStyle`]:
/// - global inputs
/// - LUTs (labelled with their truth tables)
/// - global outputs (by default, invisible node just to get an arrow).
///
/// ### Edges
/// Edge styles are additive. All edges implement the `edge_all` style. To that can be added:
/// - `edge_internal` if the edge goes from a LUT to another LUT
/// - `edge_output` if the edge is directed to a global output.
#[derive(Debug, Clone)]
pub struct GraphvizStyle {
    // Global
    pub rankdir: String,

    // Nodes
    pub input: GraphvizNodeStyle,
    pub lut: GraphvizNodeStyle,
    pub output: GraphvizNodeStyle,

    // Edges
    pub edge_all: GraphvizEdgeStyle,
    pub edge_internal: GraphvizEdgeStyle,
    pub edge_output: GraphvizEdgeStyle,
}

impl Default for GraphvizStyle {
    fn default() -> Self {
        GraphvizStyle {
            rankdir: DEFAULT_RANKDIR.to_string(),

            input: GraphvizNodeStyle::new(DEFAULT_INPUT_NODE_FORMAT),
            lut: GraphvizNodeStyle::new(DEFAULT_LUT_NODE_FORMAT),
            output: GraphvizNodeStyle::new(DEFAULT_OUTPUT_NODE_FORMAT),

            edge_all: GraphvizEdgeStyle::new(DEFAULT_EDGE_ALL_FORMAT),
            edge_internal: GraphvizEdgeStyle::new(DEFAULT_EDGE_INTERNAL_FORMAT),
            edge_output: GraphvizEdgeStyle::new(DEFAULT_EDGE_OUTPUT_FORMAT),
        }
    }
}

impl Source {
    fn get_graphviz_id(&self, lut_outputs: usize) -> String {
        match self {
            Source::GlobalInput(i) => format!("i{}", i),
            Source::LutOutput(slot) => lut_port_id(slot / lut_outputs, slot % lut_outputs),
        }
    }
}

/// Output ports of a LUT are record fields.
fn lut_port_id(lut: usize, output: usize) -> String {
    format!("lut{}:o{}", lut, output)
}

impl LutNetwork {
    /// Returns a DOT representation of the network.
    pub fn to_dot(&self, graphviz_style: GraphvizStyle) -> String {
        let t = self.topology();
        let mut decl_edges = String::new();

        // Creating different subgraphs for node declarations
        let mut decl_inputs = format!(
            "subgraph inputs {{\n rank=same\n node {}\n",
            graphviz_style.input
        );
        let mut decl_luts = format!("subgraph luts {{\n node {}\n", graphviz_style.lut);
        let mut decl_outputs = format!(
            "subgraph outputs {{\n rank=same\n node {}\n",
            graphviz_style.output
        );

        for i in 0..t.global_inputs {
            let source = Source::GlobalInput(i);
            decl_inputs.push_str(&format!(
                "{} [label=\"{}\"]\n",
                source.get_graphviz_id(t.lut_outputs),
                source
            ));
        }

        for (l, lut) in self.luts().iter().enumerate() {
            // Record: {truth tables | {o0 | o1 | ...}}
            let tables: Vec<String> = lut
                .truth_table
                .iter()
                .map(|table| table.iter().map(|&b| if b { '1' } else { '0' }).collect())
                .collect();
            let ports: Vec<String> = (0..t.lut_outputs)
                .map(|o| format!("<o{}> {}", o, l * t.lut_outputs + o))
                .collect();
            decl_luts.push_str(&format!(
                "lut{} [label=\"{{LUT {} | {} | {{{}}}}}\"]\n",
                l,
                l,
                tables.join("\\n"),
                ports.join(" | ")
            ));

            for source in &lut.inputs {
                let style = match source {
                    Source::LutOutput(_) => graphviz_style.edge_internal.clone(),
                    Source::GlobalInput(_) => GraphvizEdgeStyle::default(),
                };
                decl_edges.push_str(&format!(
                    "{} -> lut{} {}\n",
                    source.get_graphviz_id(t.lut_outputs),
                    l,
                    style
                ));
            }
        }

        // Adding artificial outputs to point to
        for (g, slot) in self.producers().iter().enumerate() {
            decl_outputs.push_str(&format!("f{} [label=\"f{}\"]\n", g, g));
            decl_edges.push_str(&format!(
                "{} -> f{} {}\n",
                Source::LutOutput(*slot).get_graphviz_id(t.lut_outputs),
                g,
                graphviz_style.edge_output
            ));
        }

        // Concatenating everything together
        format!(
            "
strict digraph {{
    rankdir=\"{}\"
    edge {}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
}}",
            graphviz_style.rankdir,
            graphviz_style.edge_all,
            decl_inputs,
            decl_luts,
            decl_outputs,
            decl_edges
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        formula::Atom, oracle::Model, signal::SignalIndex, topology::Topology,
    };

    /// `A and B` in LUT 0, `LUT0 or C` in LUT 1 driving the output.
    fn network() -> LutNetwork {
        let t = Topology::new(2, 2, 1, 3, 1);
        let index = SignalIndex::new(t, false);
        let atoms: Vec<Atom> = vec![
            index.wiring(0, 0, 0),
            index.wiring(0, 1, 1),
            index.truth_table(0, 0, 3),
            index.wiring(1, 0, 3),
            index.wiring(1, 1, 2),
            index.truth_table(1, 0, 1),
            index.truth_table(1, 0, 2),
            index.truth_table(1, 0, 3),
            index.selection(0, 1),
        ];
        let mut values = vec![false; index.atom_count()];
        for a in atoms {
            values[a.index()] = true;
        }
        LutNetwork::decode(&index, &Model::new(values)).unwrap()
    }

    #[test]
    fn network_to_dot() {
        let dot = network().to_dot(GraphvizStyle::default());
        println!("{}", dot);
        assert!(dot.contains("lut0 [label=\"{LUT 0 | 0001 | {<o0> 0}}\"]"));
        assert!(dot.contains("lut0:o0 -> lut1 [style=\"dashed\"]"));
        assert!(dot.contains("i2 -> lut1"));
        assert!(dot.contains("lut1:o0 -> f0 [arrowhead=none]"));
    }

    #[test]
    fn custom_style_test() {
        let style = GraphvizStyle {
            rankdir: "LR".to_string(),
            ..GraphvizStyle::default()
        };
        assert!(network().to_dot(style).contains("rankdir=\"LR\""));
    }

    #[test]
    fn edge_style_add_test() {
        let s = GraphvizEdgeStyle::new("[a]") + GraphvizEdgeStyle::new("[b]");
        assert_eq!(s.to_string(), "[a][b]");
    }
}
