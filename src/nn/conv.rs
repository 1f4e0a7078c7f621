//! Module implementing convolutional layers for image processing.

use crate::asg::{Padding, Shape};
use crate::nn::module::Module;
use crate::tensor::{GraphContext, Tensor};
use std::cell::RefCell;
use std::rc::Rc;

/// Configuration for Conv2d layer.
#[derive(Debug, Clone)]
pub struct Conv2dConfig {
    /// Number of input channels.
    pub in_channels: usize,
    /// Number of output channels (filters).
    pub out_channels: usize,
    /// Convolution kernel size.
    pub kernel_size: (usize, usize),
    /// Convolution stride.
    pub stride: (usize, usize),
    /// Padding mode.
    pub padding: Padding,
    /// Use bias.
    pub bias: bool,
}

impl Default for Conv2dConfig {
    fn default() -> Self {
        Self {
            in_channels: 1,
            out_channels: 1,
            kernel_size: (3, 3),
            stride: (1, 1),
            padding: Padding::Valid,
            bias: true,
        }
    }
}

impl Conv2dConfig {
    /// Creates Conv2d configuration.
    pub fn new(in_channels: usize, out_channels: usize, kernel_size: (usize, usize)) -> Self {
        Self {
            in_channels,
            out_channels,
            kernel_size,
            ..Default::default()
        }
    }

    /// Sets convolution stride.
    pub fn with_stride(mut self, stride: (usize, usize)) -> Self {
        self.stride = stride;
        self
    }

    /// Sets padding mode.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Enables/disables bias.
    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }
}

/// 2D Convolutional layer.
///
/// Applies 2D convolution to input tensor of shape [N, C_in, H, W].
/// Output tensor has shape [N, C_out, H_out, W_out].
///
/// # Example
///
/// ```rust,ignore
/// use convae::asg::Padding;
/// use convae::nn::{Conv2d, Conv2dConfig, Module};
///
/// let config = Conv2dConfig::new(1, 32, (3, 3)).with_padding(Padding::Same);
/// let conv = Conv2d::from_config(&context, "conv1", config);
/// let output = conv.forward(&input);
/// ```
pub struct Conv2d {
    /// Symbolic descriptor for weight tensor [C_out, C_in, kH, kW].
    pub weight: Tensor,
    /// Optional symbolic descriptor for bias [C_out].
    pub bias: Option<Tensor>,
    /// Layer configuration.
    pub config: Conv2dConfig,
    /// Base name; the convolution node in the graph carries this name.
    pub name: String,
}

impl Conv2d {
    /// Creates a new Conv2d layer with basic parameters.
    ///
    /// # Arguments
    ///
    /// * `context` - Reference to GraphContext
    /// * `name` - Base name for the layer and its parameters
    /// * `in_channels` - Number of input channels
    /// * `out_channels` - Number of output channels
    /// * `kernel_size` - Kernel size (kH, kW)
    pub fn new(
        context: &Rc<RefCell<GraphContext>>,
        name: &str,
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
    ) -> Self {
        let config = Conv2dConfig::new(in_channels, out_channels, kernel_size);
        Self::from_config(context, name, config)
    }

    /// Creates Conv2d layer from configuration.
    pub fn from_config(
        context: &Rc<RefCell<GraphContext>>,
        name: &str,
        config: Conv2dConfig,
    ) -> Self {
        let weight_name = format!("{}.weight", name);
        let weight = Tensor::new_parameter(context, &weight_name);

        let bias = if config.bias {
            let bias_name = format!("{}.bias", name);
            Some(Tensor::new_parameter(context, &bias_name))
        } else {
            None
        };

        Self {
            weight,
            bias,
            config,
            name: name.to_string(),
        }
    }

    /// Sets convolution stride.
    pub fn with_stride(mut self, stride: (usize, usize)) -> Self {
        self.config.stride = stride;
        self
    }

    /// Sets padding mode.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.config.padding = padding;
        self
    }

    /// Names and shapes of the layer's parameters, for shape inference
    /// and initialization.
    pub fn parameter_shapes(&self) -> Vec<(String, Shape)> {
        let mut shapes = vec![(
            format!("{}.weight", self.name),
            vec![
                self.config.out_channels,
                self.config.in_channels,
                self.config.kernel_size.0,
                self.config.kernel_size.1,
            ],
        )];
        if self.config.bias {
            shapes.push((format!("{}.bias", self.name), vec![self.config.out_channels]));
        }
        shapes
    }
}

impl Module for Conv2d {
    /// Applies convolution to input.
    fn forward(&self, inputs: &Tensor) -> Tensor {
        inputs.conv2d(
            &self.weight,
            self.bias.as_ref(),
            self.config.stride,
            self.config.padding,
            Some(&self.name),
        )
    }

    /// Returns trainable parameters of the layer.
    fn parameters(&self) -> Vec<Tensor> {
        let mut params = vec![self.weight.clone()];
        if let Some(ref bias) = self.bias {
            params.push(bias.clone());
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv2d_creation() {
        let context = Rc::new(RefCell::new(GraphContext::new()));
        let config = Conv2dConfig::new(3, 64, (3, 3)).with_padding(Padding::Same);
        let conv = Conv2d::from_config(&context, "conv1", config).with_stride((2, 2));

        assert_eq!(conv.config.in_channels, 3);
        assert_eq!(conv.config.out_channels, 64);
        assert_eq!(conv.config.kernel_size, (3, 3));
        assert_eq!(conv.config.stride, (2, 2));
        assert_eq!(conv.config.padding, Padding::Same);
        assert!(conv.bias.is_some());
    }

    #[test]
    fn test_conv2d_forward_adds_named_node() {
        let context = Rc::new(RefCell::new(GraphContext::new()));
        let input = Tensor::new_input(&context, "input");
        let conv = Conv2d::new(&context, "conv1", 3, 64, (3, 3));

        let output = conv.forward(&input);

        let ctx = context.borrow();
        let node = ctx.main_graph().get_node(output.node_id).unwrap();
        assert_eq!(node.name.as_deref(), Some("conv1"));
    }

    #[test]
    fn test_conv2d_no_bias() {
        let context = Rc::new(RefCell::new(GraphContext::new()));
        let config = Conv2dConfig::new(3, 64, (3, 3)).with_bias(false);
        let conv = Conv2d::from_config(&context, "conv1", config);

        assert!(conv.bias.is_none());
        assert_eq!(conv.parameters().len(), 1);
        assert_eq!(conv.parameter_shapes().len(), 1);
    }

    #[test]
    fn test_conv2d_parameter_shapes() {
        let context = Rc::new(RefCell::new(GraphContext::new()));
        let conv = Conv2d::new(&context, "conv1", 1, 32, (3, 3));

        let shapes = conv.parameter_shapes();
        assert_eq!(shapes[0], ("conv1.weight".to_string(), vec![32, 1, 3, 3]));
        assert_eq!(shapes[1], ("conv1.bias".to_string(), vec![32]));
    }
}
