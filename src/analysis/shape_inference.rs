//! Module for shape inference.
//!
//! Traverses the computation graph and determines the shape of the output
//! tensor for each node based on its input shapes and operation type.

use crate::asg::{Asg, AsgError, Node, NodeId, NodeType, Padding, Shape, Value};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeInferenceError {
    #[error("Graph error: {0}")]
    AsgError(#[from] AsgError),

    #[error("Incompatible shapes for operation '{op}': left operand {shape1:?}, right operand {shape2:?}. \
             Ensure dimensions are compatible for broadcasting or matrix multiplication.")]
    IncompatibleShapes {
        op: String,
        shape1: Shape,
        shape2: Shape,
    },

    #[error("Shape information missing for node {0}. \
             This may mean the node has not been processed by shape inference yet or the graph contains a cyclic dependency.")]
    MissingShapeInfo(NodeId),

    #[error("Initial shape not specified for '{0}'. \
             Add the shape to the initial_shapes HashMap when calling ShapeInference::run().")]
    MissingInitialShape(String),

    #[error("Invalid tensor rank for node {node_id}: expected {expected}D, got {actual}D. \
             Check input data dimensions.")]
    InvalidRank {
        node_id: NodeId,
        expected: usize,
        actual: usize,
    },

    #[error("Convolution kernel {kernel:?} does not fit input of spatial size {input:?} at node {node_id} \
             with 'valid' padding.")]
    KernelExceedsInput {
        node_id: NodeId,
        kernel: (usize, usize),
        input: (usize, usize),
    },
}

type Result<T> = std::result::Result<T, ShapeInferenceError>;

/// Structure that performs shape inference for ASG.
pub struct ShapeInference;

impl ShapeInference {
    /// Runs the shape inference process for the graph.
    ///
    /// Modifies the graph in-place, filling in the `shape` field for each
    /// node reachable from the graph outputs.
    ///
    /// # Arguments
    /// * `asg` - Mutable reference to the graph to analyze.
    /// * `initial_shapes` - HashMap providing shapes for all `Input` and
    ///   `Parameter` nodes. Key is the node name.
    pub fn run(asg: &mut Asg, initial_shapes: &HashMap<String, Shape>) -> Result<()> {
        let sorted_nodes = Self::topological_sort(asg)?;

        for node_id in sorted_nodes {
            let mut node = asg.get_node(node_id)?.clone();

            let shape = Self::infer_node_shape(asg, &node, initial_shapes)?;

            node.shape = Some(shape);
            asg.nodes.insert(node_id, node);
        }

        Ok(())
    }

    /// Main shape inference logic for a single node.
    fn infer_node_shape(
        asg: &Asg,
        node: &Node,
        initial_shapes: &HashMap<String, Shape>,
    ) -> Result<Shape> {
        match &node.node_type {
            NodeType::Input { name } | NodeType::Parameter { name } => initial_shapes
                .get(name)
                .cloned()
                .ok_or_else(|| ShapeInferenceError::MissingInitialShape(name.clone())),

            NodeType::Literal(value) => match value {
                Value::Tensor(arr) => Ok(arr.shape().to_vec()),
                Value::ScalarF32(_) => Ok(vec![]),
            },

            NodeType::Add(l, r)
            | NodeType::Subtract(l, r)
            | NodeType::Multiply(l, r)
            | NodeType::Divide(l, r) => {
                let ls = Self::get_shape(asg, *l)?;
                let rs = Self::get_shape(asg, *r)?;

                // Broadcasting: the operand with more elements dictates
                // the output shape.
                let out_shape = if ls.iter().product::<usize>() >= rs.iter().product::<usize>() {
                    ls
                } else {
                    rs
                };

                Ok(out_shape)
            }

            NodeType::MatrixMultiply(l, r) => {
                let ls = Self::get_shape(asg, *l)?;
                let rs = Self::get_shape(asg, *r)?;

                if ls.len() < 2 || rs.len() < 2 {
                    return Err(ShapeInferenceError::InvalidRank {
                        node_id: node.id,
                        expected: 2,
                        actual: ls.len().min(rs.len()),
                    });
                }

                let m = ls[ls.len() - 2];
                let k1 = ls[ls.len() - 1];
                let k2 = rs[rs.len() - 2];
                let n = rs[rs.len() - 1];

                if k1 != k2 {
                    return Err(ShapeInferenceError::IncompatibleShapes {
                        op: "MatrixMultiply".to_string(),
                        shape1: ls,
                        shape2: rs,
                    });
                }

                let mut out_shape = if ls.len() > 2 { ls[..ls.len() - 2].to_vec() } else { vec![] };
                out_shape.push(m);
                out_shape.push(n);

                Ok(out_shape)
            }

            // Element-wise operations - shape unchanged
            NodeType::ReLU(id) | NodeType::Sqrt(id) => Self::get_shape(asg, *id),

            NodeType::Mean(id) | NodeType::Variance(id) => {
                let mut shape = Self::get_shape(asg, *id)?;
                // Don't remove the dimension, set it to 1 to preserve tensor
                // rank for correct broadcasting.
                if !shape.is_empty() {
                    *shape.last_mut().unwrap() = 1;
                }
                Ok(shape)
            }

            // Flatten: [N, ...] -> [N, prod(...)]
            NodeType::Flatten(id) => {
                let shape = Self::get_shape(asg, *id)?;
                if shape.len() < 2 {
                    return Err(ShapeInferenceError::InvalidRank {
                        node_id: node.id,
                        expected: 2,
                        actual: shape.len(),
                    });
                }
                let n = shape[0];
                let flat: usize = shape[1..].iter().product();
                Ok(vec![n, flat])
            }

            // Conv2d: [N, C_in, H, W] -> [N, C_out, H_out, W_out]
            NodeType::Conv2d { input, weight, stride, padding, .. } => {
                let input_shape = Self::get_shape(asg, *input)?;
                let weight_shape = Self::get_shape(asg, *weight)?;

                if input_shape.len() != 4 {
                    return Err(ShapeInferenceError::InvalidRank {
                        node_id: node.id,
                        expected: 4,
                        actual: input_shape.len(),
                    });
                }
                if weight_shape.len() != 4 {
                    return Err(ShapeInferenceError::InvalidRank {
                        node_id: node.id,
                        expected: 4,
                        actual: weight_shape.len(),
                    });
                }

                // weight is [C_out, C_in, kH, kW]; its C_in must match input.
                if weight_shape[1] != input_shape[1] {
                    return Err(ShapeInferenceError::IncompatibleShapes {
                        op: "Conv2d".to_string(),
                        shape1: input_shape,
                        shape2: weight_shape,
                    });
                }

                let n = input_shape[0];
                let h = input_shape[2];
                let w = input_shape[3];

                let out_channels = weight_shape[0];
                let kernel_h = weight_shape[2];
                let kernel_w = weight_shape[3];

                let (out_h, out_w) = match padding {
                    Padding::Valid => {
                        if h < kernel_h || w < kernel_w {
                            return Err(ShapeInferenceError::KernelExceedsInput {
                                node_id: node.id,
                                kernel: (kernel_h, kernel_w),
                                input: (h, w),
                            });
                        }
                        ((h - kernel_h) / stride.0 + 1, (w - kernel_w) / stride.1 + 1)
                    }
                    // Keras 'same': out = ceil(in / stride)
                    Padding::Same => (
                        (h + stride.0 - 1) / stride.0,
                        (w + stride.1 - 1) / stride.1,
                    ),
                };

                Ok(vec![n, out_channels, out_h, out_w])
            }
        }
    }

    /// Helper function to get an already computed shape for a node.
    fn get_shape(asg: &Asg, node_id: NodeId) -> Result<Shape> {
        let node = asg.get_node(node_id)?;
        node.shape
            .clone()
            .ok_or(ShapeInferenceError::MissingShapeInfo(node_id))
    }

    /// Performs topological sort of the graph.
    /// Returns a vector of node IDs in order suitable for computation.
    pub fn topological_sort(asg: &Asg) -> Result<Vec<NodeId>> {
        let mut sorted = Vec::new();
        let mut visited = HashSet::new();
        // IMPORTANT: need to traverse all outputs, not just one
        for output_id in &asg.outputs {
            Self::build_sorted_graph(*output_id, asg, &mut visited, &mut sorted)?;
        }
        Ok(sorted)
    }

    fn build_sorted_graph(
        node_id: NodeId,
        asg: &Asg,
        visited: &mut HashSet<NodeId>,
        sorted: &mut Vec<NodeId>,
    ) -> Result<()> {
        if visited.contains(&node_id) {
            return Ok(());
        }

        let node = asg.get_node(node_id)?;

        let inputs = match &node.node_type {
            NodeType::Add(a, b)
            | NodeType::Subtract(a, b)
            | NodeType::Multiply(a, b)
            | NodeType::Divide(a, b)
            | NodeType::MatrixMultiply(a, b) => vec![*a, *b],

            NodeType::ReLU(a)
            | NodeType::Sqrt(a)
            | NodeType::Mean(a)
            | NodeType::Variance(a)
            | NodeType::Flatten(a) => vec![*a],

            NodeType::Conv2d { input, weight, bias, .. } => {
                let mut deps = vec![*input, *weight];
                if let Some(b) = bias {
                    deps.push(*b);
                }
                deps
            }

            NodeType::Input { .. } | NodeType::Parameter { .. } | NodeType::Literal(_) => vec![],
        };

        for input_id in inputs {
            Self::build_sorted_graph(input_id, asg, visited, sorted)?;
        }

        if !visited.contains(&node_id) {
            visited.insert(node_id);
            sorted.push(node_id);
        }
        Ok(())
    }
}
