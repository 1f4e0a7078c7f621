//! # ConvAE: Graph-based Convolutional Autoencoder Builder in Rust
//!
//! **ConvAE** declaratively constructs the encoder half of a convolutional
//! autoencoder. Its architecture is built around an **Abstract Semantic
//! Graph (ASG)**: layers never hold real numbers, they only append
//! operation and parameter nodes to the graph, and a shape-inference pass
//! annotates the finished graph so it can be inspected (Keras-style
//! `summary`) without ever being executed.
//!
//! ## Usage Example
//!
//! ```no_run
//! use convae::models::Autoencoder;
//!
//! // (28, 28, 1) grayscale input, one 3x3 conv block with 32 filters at
//! // stride 1, compressed into a 2-dimensional latent vector.
//! let ae = Autoencoder::new((28, 28, 1), vec![32], vec![3], vec![1], 2)
//!     .expect("valid configuration");
//!
//! ae.summary();
//! assert_eq!(ae.encoder().output_shape(), &vec![1, 2]);
//! assert_eq!(ae.shape_before_bottleneck(), &vec![32, 28, 28]);
//! ```
//!
//! The decoder and the full autoencoder assembly are out of scope: the
//! builder records the pre-bottleneck feature-map shape for future decoder
//! work but makes no assumption about the decoder's architecture.

// Declare public modules that constitute the core library API.
pub mod analysis;
pub mod asg;
pub mod models;
pub mod nn;
pub mod tensor;
