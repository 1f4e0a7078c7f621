//! # Graph Analysis Module
//!
//! This module contains analysis passes that process the ASG after it has
//! been built by the model constructors.
//!
//! ## Available Passes
//!
//! - [`ShapeInference`](shape_inference::ShapeInference): Propagates tensor
//!   shapes through the graph, detecting shape mismatches at build time.
//!
//! ## How It Works
//!
//! ```text
//! ASG (untyped) -> Shape Inference -> ASG (with shapes)
//! ```
//!
//! Shape inference is what allows the encoder builder to record the feature
//! map shape before the bottleneck and to render a layer summary without ever
//! executing the graph.
//!
//! ## Example
//!
//! ```ignore
//! use convae::analysis::shape_inference::ShapeInference;
//!
//! let mut graph = context.borrow().main_graph().clone();
//!
//! // Provide initial shapes for inputs and parameters
//! let shapes = HashMap::from([
//!     ("encoder_input".to_string(), vec![1, 1, 28, 28]),
//! ]);
//!
//! ShapeInference::run(&mut graph, &shapes)?;
//! ```

pub mod shape_inference;
