//! Immutable container for a fully built model graph.
//!
//! A `Model` owns a shape-annotated ASG together with per-layer records,
//! which is enough to introspect the architecture (Keras-style `summary`)
//! and to produce initial parameter buffers, without any runtime.

use crate::asg::{Asg, NodeId, Shape, Value};
use crate::nn::init;
use std::collections::HashMap;
use std::fmt::Write as _;

/// What kind of layer a [`LayerRecord`] describes, for display purposes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Input,
    Conv2d,
    BatchNorm,
    Flatten,
    Dense,
}

impl LayerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerKind::Input => "Input",
            LayerKind::Conv2d => "Conv2D",
            LayerKind::BatchNorm => "BatchNorm",
            LayerKind::Flatten => "Flatten",
            LayerKind::Dense => "Dense",
        }
    }
}

/// One entry of the model's ordered layer list.
#[derive(Debug, Clone)]
pub struct LayerRecord {
    /// Layer name as it appears in the graph.
    pub name: String,
    /// Layer kind.
    pub kind: LayerKind,
    /// Graph node carrying the layer's output.
    pub node_id: NodeId,
    /// Names of the layer's `Parameter` nodes.
    pub parameters: Vec<String>,
}

/// A named, read-only model: the encoder graph plus its introspection data.
///
/// Built once by a model constructor; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    graph: Asg,
    input: NodeId,
    output: NodeId,
    output_shape: Shape,
    layers: Vec<LayerRecord>,
    param_shapes: HashMap<String, Shape>,
}

impl Model {
    pub(crate) fn new(
        name: &str,
        graph: Asg,
        input: NodeId,
        output: NodeId,
        output_shape: Shape,
        layers: Vec<LayerRecord>,
        param_shapes: HashMap<String, Shape>,
    ) -> Self {
        Self {
            name: name.to_string(),
            graph,
            input,
            output,
            output_shape,
            layers,
            param_shapes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying shape-annotated graph.
    pub fn graph(&self) -> &Asg {
        &self.graph
    }

    pub fn input_node(&self) -> NodeId {
        self.input
    }

    pub fn output_node(&self) -> NodeId {
        self.output
    }

    /// Shape of the model output, batch axis included.
    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    /// Ordered layer records, input first.
    pub fn layers(&self) -> &[LayerRecord] {
        &self.layers
    }

    /// Shapes of all `Parameter` nodes, keyed by parameter name.
    pub fn parameter_shapes(&self) -> &HashMap<String, Shape> {
        &self.param_shapes
    }

    /// Total number of scalar parameters in the model.
    pub fn num_parameters(&self) -> usize {
        self.param_shapes
            .values()
            .map(|s| s.iter().product::<usize>())
            .sum()
    }

    /// Produces concrete initial buffers for every parameter:
    /// Glorot-uniform for weights, ones for batch-norm scales, zeros for
    /// biases and shifts.
    pub fn init_parameters(&self) -> HashMap<String, Value> {
        self.param_shapes
            .iter()
            .map(|(name, shape)| {
                let buffer = if name.ends_with(".gamma") {
                    init::ones(shape)
                } else if name.ends_with(".bias") || name.ends_with(".beta") {
                    init::zeros(shape)
                } else {
                    init::glorot_uniform(shape)
                };
                (name.clone(), Value::Tensor(buffer))
            })
            .collect()
    }

    /// Number of scalar parameters belonging to one layer record.
    fn layer_param_count(&self, record: &LayerRecord) -> usize {
        record
            .parameters
            .iter()
            .filter_map(|name| self.param_shapes.get(name))
            .map(|s| s.iter().product::<usize>())
            .sum()
    }

    /// Output shape of one layer, as annotated by shape inference.
    pub fn layer_output_shape(&self, record: &LayerRecord) -> Option<&Shape> {
        self.graph
            .nodes
            .get(&record.node_id)
            .and_then(|node| node.shape.as_ref())
    }

    /// Renders a Keras-style layer table.
    pub fn summary_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Model: \"{}\"", self.name);
        let _ = writeln!(out, "{}", "=".repeat(78));
        let _ = writeln!(
            out,
            "{:<44} {:<22} {:>10}",
            "Layer (type)", "Output Shape", "Param #"
        );
        let _ = writeln!(out, "{}", "-".repeat(78));

        for record in &self.layers {
            let title = format!("{} ({})", record.name, record.kind.as_str());
            let shape = match self.layer_output_shape(record) {
                Some(s) => format!("{:?}", s),
                None => "?".to_string(),
            };
            let _ = writeln!(
                out,
                "{:<44} {:<22} {:>10}",
                title,
                shape,
                self.layer_param_count(record)
            );
        }

        let _ = writeln!(out, "{}", "=".repeat(78));
        let _ = writeln!(out, "Total params: {}", self.num_parameters());
        out
    }

    /// Prints the layer table to stdout. Purely diagnostic.
    pub fn summary(&self) {
        print!("{}", self.summary_string());
    }
}
