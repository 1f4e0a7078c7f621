//! Encoder half of a convolutional autoencoder.
//!
//! The constructor assembles, in one synchronous step, a stack of
//! Conv2d + ReLU + BatchNorm blocks feeding a flattened dense bottleneck,
//! and wraps the resulting graph in an immutable [`Model`].
//!
//! The decoder and the full autoencoder assembly are deliberately absent:
//! their architecture is not specified here, and in particular the decoder
//! is NOT assumed to mirror the encoder. The feature-map shape recorded
//! before the bottleneck is retained so a future decoder can be built
//! against it.

use crate::analysis::shape_inference::{ShapeInference, ShapeInferenceError};
use crate::asg::{Padding, Shape};
use crate::models::model::{LayerKind, LayerRecord, Model};
use crate::models::ModelError;
use crate::nn::{BatchNorm, Conv2d, Conv2dConfig, Linear, Module, ReLU};
use crate::tensor::{GraphContext, Tensor};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Name of the symbolic input node.
const INPUT_NAME: &str = "encoder_input";

/// Mutable scratch state used only while the graph is being assembled.
/// Nothing of it escapes: the finished pieces move into [`Model`].
struct EncoderWorkspace {
    context: Rc<RefCell<GraphContext>>,
    initial_shapes: HashMap<String, Shape>,
    layers: Vec<LayerRecord>,
}

/// The encoder of a convolutional autoencoder.
///
/// Holds the immutable configuration it was built from, the finished
/// encoder [`Model`], and the feature-map shape recorded just before the
/// bottleneck.
///
/// # Example
///
/// ```rust,ignore
/// use convae::models::Autoencoder;
///
/// let ae = Autoencoder::new((28, 28, 1), vec![32, 64], vec![3, 3], vec![1, 2], 2)?;
/// ae.summary();
/// assert_eq!(ae.encoder().output_shape(), &vec![1, 2]);
/// ```
#[derive(Debug)]
pub struct Autoencoder {
    input_shape: (usize, usize, usize),
    conv_filters: Vec<usize>,
    conv_kernels: Vec<usize>,
    conv_strides: Vec<usize>,
    latent_space_dim: usize,
    shape_before_bottleneck: Shape,
    encoder: Model,
}

impl Autoencoder {
    /// Builds the encoder graph from the given configuration.
    ///
    /// # Arguments
    ///
    /// * `input_shape` - `(height, width, channels)` of the input image.
    ///   Internally the graph uses the NCHW layout `[1, C, H, W]`.
    /// * `conv_filters` - Filter count per convolutional block.
    /// * `conv_kernels` - Square kernel size per block.
    /// * `conv_strides` - Stride per block.
    /// * `latent_space_dim` - Dimensionality of the latent vector.
    ///
    /// The three per-layer sequences must have equal, non-zero length;
    /// otherwise [`ModelError::MismatchedLayerConfig`] or
    /// [`ModelError::EmptyLayerStack`] is returned. Construction either
    /// fully succeeds or fails atomically; no partially built value escapes.
    pub fn new(
        input_shape: (usize, usize, usize),
        conv_filters: Vec<usize>,
        conv_kernels: Vec<usize>,
        conv_strides: Vec<usize>,
        latent_space_dim: usize,
    ) -> Result<Self, ModelError> {
        if conv_filters.len() != conv_kernels.len() || conv_kernels.len() != conv_strides.len() {
            return Err(ModelError::MismatchedLayerConfig {
                filters: conv_filters.len(),
                kernels: conv_kernels.len(),
                strides: conv_strides.len(),
            });
        }
        if conv_filters.is_empty() {
            return Err(ModelError::EmptyLayerStack);
        }

        let mut ws = EncoderWorkspace {
            context: Rc::new(RefCell::new(GraphContext::new())),
            initial_shapes: HashMap::new(),
            layers: Vec::new(),
        };

        let encoder_input = Self::add_encoder_input(&mut ws, input_shape);
        let conv_stack = Self::add_conv_layers(
            &mut ws,
            &encoder_input,
            input_shape.2,
            &conv_filters,
            &conv_kernels,
            &conv_strides,
        );
        let (bottleneck, shape_before_bottleneck) =
            Self::add_bottleneck(&mut ws, &conv_stack, latent_space_dim)?;

        // Annotate the finished graph with shapes; any inconsistency in the
        // configuration surfaces here as a ShapeInferenceError.
        let mut graph = ws.context.borrow().main_graph().clone();
        graph.set_output(bottleneck.node_id);
        ShapeInference::run(&mut graph, &ws.initial_shapes)?;

        let output_shape = graph
            .get_node(bottleneck.node_id)?
            .shape
            .clone()
            .ok_or(ShapeInferenceError::MissingShapeInfo(bottleneck.node_id))?;

        let mut param_shapes = ws.initial_shapes;
        param_shapes.remove(INPUT_NAME);

        let encoder = Model::new(
            "encoder",
            graph,
            encoder_input.node_id,
            bottleneck.node_id,
            output_shape,
            ws.layers,
            param_shapes,
        );

        Ok(Self {
            input_shape,
            conv_filters,
            conv_kernels,
            conv_strides,
            latent_space_dim,
            shape_before_bottleneck,
            encoder,
        })
    }

    /// Declares the symbolic input tensor of the configured shape.
    fn add_encoder_input(
        ws: &mut EncoderWorkspace,
        input_shape: (usize, usize, usize),
    ) -> Tensor {
        let (height, width, channels) = input_shape;
        let input = Tensor::new_input(&ws.context, INPUT_NAME);

        ws.initial_shapes
            .insert(INPUT_NAME.to_string(), vec![1, channels, height, width]);
        ws.layers.push(LayerRecord {
            name: INPUT_NAME.to_string(),
            kind: LayerKind::Input,
            node_id: input.node_id,
            parameters: vec![],
        });

        input
    }

    /// Appends every configured convolutional block, threading the running
    /// tensor forward.
    fn add_conv_layers(
        ws: &mut EncoderWorkspace,
        encoder_input: &Tensor,
        in_channels: usize,
        conv_filters: &[usize],
        conv_kernels: &[usize],
        conv_strides: &[usize],
    ) -> Tensor {
        let mut x = encoder_input.clone();
        let mut channels = in_channels;
        for layer_index in 0..conv_filters.len() {
            x = Self::add_conv_layer(
                ws,
                layer_index,
                &x,
                channels,
                conv_filters[layer_index],
                conv_kernels[layer_index],
                conv_strides[layer_index],
            );
            channels = conv_filters[layer_index];
        }
        x
    }

    /// Appends one convolutional block: Conv2D + ReLU + batch normalization.
    fn add_conv_layer(
        ws: &mut EncoderWorkspace,
        layer_index: usize,
        x: &Tensor,
        in_channels: usize,
        filters: usize,
        kernel: usize,
        stride: usize,
    ) -> Tensor {
        // Layers are numbered from 1, not 0.
        let layer_number = layer_index + 1;
        let conv_name = format!("encoder_conv_layer_number_{}", layer_number);
        let bn_name = format!("encoder_batch_norm_layer_number_{}", layer_number);

        let config = Conv2dConfig::new(in_channels, filters, (kernel, kernel))
            .with_stride((stride, stride))
            .with_padding(Padding::Same);
        let conv = Conv2d::from_config(&ws.context, &conv_name, config);
        for (name, shape) in conv.parameter_shapes() {
            ws.initial_shapes.insert(name, shape);
        }

        let conv_out = conv.forward(x);
        ws.layers.push(LayerRecord {
            name: conv_name,
            kind: LayerKind::Conv2d,
            node_id: conv_out.node_id,
            parameters: conv.parameter_shapes().into_iter().map(|(n, _)| n).collect(),
        });

        let activated = ReLU::new().forward(&conv_out);

        let bn = BatchNorm::new(&ws.context, &bn_name, filters);
        for (name, shape) in bn.parameter_shapes() {
            ws.initial_shapes.insert(name, shape);
        }
        let normalized = bn.forward(&activated);
        ws.layers.push(LayerRecord {
            name: bn_name,
            kind: LayerKind::BatchNorm,
            node_id: normalized.node_id,
            parameters: bn.parameter_shapes().into_iter().map(|(n, _)| n).collect(),
        });

        normalized
    }

    /// Flattens the final feature map and projects it to the latent
    /// dimensionality, with no activation.
    ///
    /// As a side effect, records the pre-flatten feature-map shape
    /// (batch axis stripped) for eventual decoder construction.
    fn add_bottleneck(
        ws: &mut EncoderWorkspace,
        x: &Tensor,
        latent_space_dim: usize,
    ) -> Result<(Tensor, Shape), ModelError> {
        // Infer the running shape up to the last conv block. This probe is
        // the single source of truth for convolution arithmetic; the builder
        // never duplicates it.
        let mut probe = ws.context.borrow().main_graph().clone();
        probe.set_output(x.node_id);
        ShapeInference::run(&mut probe, &ws.initial_shapes)?;
        let full_shape = probe
            .get_node(x.node_id)?
            .shape
            .clone()
            .ok_or(ShapeInferenceError::MissingShapeInfo(x.node_id))?;
        let shape_before_bottleneck: Shape = full_shape[1..].to_vec();
        let flat_features: usize = shape_before_bottleneck.iter().product();

        let flattened = x.flatten(Some("encoder_flatten"));
        ws.layers.push(LayerRecord {
            name: "encoder_flatten".to_string(),
            kind: LayerKind::Flatten,
            node_id: flattened.node_id,
            parameters: vec![],
        });

        let dense = Linear::new(&ws.context, "encoder_output", flat_features, latent_space_dim);
        for (name, shape) in dense.parameter_shapes() {
            ws.initial_shapes.insert(name, shape);
        }
        let output = dense.forward(&flattened);
        ws.layers.push(LayerRecord {
            name: "encoder_output".to_string(),
            kind: LayerKind::Dense,
            node_id: output.node_id,
            parameters: dense.parameter_shapes().into_iter().map(|(n, _)| n).collect(),
        });

        Ok((output, shape_before_bottleneck))
    }

    /// Delegates to the encoder model's introspection.
    pub fn summary(&self) {
        self.encoder.summary();
    }

    /// The finished encoder model.
    pub fn encoder(&self) -> &Model {
        &self.encoder
    }

    /// Feature-map shape `[C, H, W]` immediately before flattening.
    /// Retained for eventual decoder construction.
    pub fn shape_before_bottleneck(&self) -> &Shape {
        &self.shape_before_bottleneck
    }

    pub fn input_shape(&self) -> (usize, usize, usize) {
        self.input_shape
    }

    pub fn conv_filters(&self) -> &[usize] {
        &self.conv_filters
    }

    pub fn conv_kernels(&self) -> &[usize] {
        &self.conv_kernels
    }

    pub fn conv_strides(&self) -> &[usize] {
        &self.conv_strides
    }

    pub fn latent_space_dim(&self) -> usize {
        self.latent_space_dim
    }

    /// Number of convolutional blocks in the encoder.
    pub fn num_conv_layers(&self) -> usize {
        self.conv_filters.len()
    }
}
