//! # Neural Network Layers Module
//!
//! This module contains building blocks for constructing neural networks.
//!
//! In the graph-based architecture, each "layer" is a constructor that adds
//! a specific pattern of nodes (operations and parameters) to the ASG.
//!
//! ## Available Layers
//!
//! ### Core Layers
//! - [`Linear`]: Fully connected / dense layer
//! - [`Conv2d`]: 2D convolution with configurable stride and padding mode
//!
//! ### Normalization
//! - [`BatchNorm`]: Batch normalization
//!
//! ### Activations
//! - [`ReLU`]: Rectified linear unit
//!
//! ### Initialization
//! - [`init`]: Glorot-uniform / zeros / ones parameter buffers
//!
//! ## Example
//!
//! ```ignore
//! use convae::nn::{Linear, ReLU, Module};
//! use convae::tensor::{GraphContext, Tensor};
//!
//! let ctx = Rc::new(RefCell::new(GraphContext::new()));
//! let dense = Linear::new(&ctx, "fc1", 784, 128);
//! let relu = ReLU::new();
//!
//! let x = Tensor::new_input(&ctx, "input");
//! let h = relu.forward(&dense.forward(&x));
//! ```

// Declare all submodules
pub mod activations;
pub mod batchnorm;
pub mod conv;
pub mod init;
pub mod linear;
pub mod module;

// Re-export structures for convenience

// Activations
pub use activations::ReLU;

// Convolutional layers
pub use conv::{Conv2d, Conv2dConfig};

// Other layers
pub use batchnorm::BatchNorm;
pub use linear::Linear;

// Base trait
pub use module::Module;
