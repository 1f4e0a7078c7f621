//! # Models Module
//!
//! High-level model constructors built on top of the [`nn`](crate::nn)
//! layers. A model constructor assembles a complete, shape-annotated graph
//! in one synchronous step and returns it wrapped in an immutable
//! [`Model`] container.
//!
//! ## Available Models
//!
//! - [`Autoencoder`]: the encoder half of a convolutional autoencoder
//!   (Conv2d + ReLU + BatchNorm blocks feeding a dense bottleneck).

pub mod autoencoder;
pub mod model;

pub use autoencoder::Autoencoder;
pub use model::{LayerKind, LayerRecord, Model};

use crate::analysis::shape_inference::ShapeInferenceError;
use crate::asg::AsgError;
use thiserror::Error;

/// Errors surfaced while constructing a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("conv_filters, conv_kernels and conv_strides must have equal lengths, \
             got {filters}, {kernels} and {strides}")]
    MismatchedLayerConfig {
        filters: usize,
        kernels: usize,
        strides: usize,
    },

    #[error("at least one convolutional layer is required")]
    EmptyLayerStack,

    #[error(transparent)]
    Shape(#[from] ShapeInferenceError),

    #[error(transparent)]
    Asg(#[from] AsgError),
}
