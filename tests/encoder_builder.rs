//! Integration tests for the convolutional encoder builder.
//!
//! These tests only inspect the built graph and its annotations; the graph
//! is never executed.

use convae::asg::NodeType;
use convae::models::{Autoencoder, LayerKind, ModelError};

/// The worked reference configuration: one 3x3/32 block on a 28x28x1 input,
/// compressed to a 2-dimensional latent vector.
fn reference_encoder() -> Autoencoder {
    Autoencoder::new((28, 28, 1), vec![32], vec![3], vec![1], 2)
        .expect("reference configuration must build")
}

#[test]
fn builds_one_conv_block_per_configured_layer() {
    let ae = Autoencoder::new(
        (28, 28, 1),
        vec![32, 64, 64, 64],
        vec![3, 3, 3, 3],
        vec![1, 2, 2, 1],
        2,
    )
    .unwrap();

    let conv_records = ae
        .encoder()
        .layers()
        .iter()
        .filter(|r| r.kind == LayerKind::Conv2d)
        .count();
    assert_eq!(conv_records, 4);
    assert_eq!(ae.num_conv_layers(), 4);

    // The graph itself must contain exactly as many Conv2d nodes,
    // followed by exactly one dense (matrix multiply) bottleneck.
    let graph = ae.encoder().graph();
    let conv_nodes = graph
        .nodes
        .values()
        .filter(|n| matches!(n.node_type, NodeType::Conv2d { .. }))
        .count();
    let matmul_nodes = graph
        .nodes
        .values()
        .filter(|n| matches!(n.node_type, NodeType::MatrixMultiply(_, _)))
        .count();
    assert_eq!(conv_nodes, 4);
    assert_eq!(matmul_nodes, 1);

    let dense_records = ae
        .encoder()
        .layers()
        .iter()
        .filter(|r| r.kind == LayerKind::Dense)
        .count();
    assert_eq!(dense_records, 1);
}

#[test]
fn latent_vector_has_configured_dimensionality() {
    let ae = Autoencoder::new(
        (32, 32, 3),
        vec![16, 32],
        vec![3, 3],
        vec![2, 2],
        10,
    )
    .unwrap();
    assert_eq!(ae.encoder().output_shape(), &vec![1, 10]);

    let ae = reference_encoder();
    assert_eq!(ae.encoder().output_shape(), &vec![1, 2]);
}

#[test]
fn recorded_shape_matches_last_conv_block_output() {
    let ae = Autoencoder::new(
        (28, 28, 1),
        vec![32, 64, 64, 64],
        vec![3, 3, 3, 3],
        vec![1, 2, 2, 1],
        2,
    )
    .unwrap();

    // 'same' padding: 28 -> 28 -> 14 -> 7 -> 7
    assert_eq!(ae.shape_before_bottleneck(), &vec![64, 7, 7]);

    // Cross-check against the shape the inference pass annotated on the
    // last block's output (the final BatchNorm node).
    let last_block = ae
        .encoder()
        .layers()
        .iter()
        .filter(|r| r.kind == LayerKind::BatchNorm)
        .last()
        .expect("encoder must contain batch-norm layers");
    let annotated = ae
        .encoder()
        .layer_output_shape(last_block)
        .expect("built graph must be shape-annotated");
    assert_eq!(&annotated[1..], ae.shape_before_bottleneck().as_slice());
}

#[test]
fn layer_naming_is_deterministic_and_one_based() {
    let ae = Autoencoder::new(
        (28, 28, 1),
        vec![32, 64],
        vec![3, 3],
        vec![1, 2],
        2,
    )
    .unwrap();

    let names: Vec<&str> = ae
        .encoder()
        .layers()
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "encoder_input",
            "encoder_conv_layer_number_1",
            "encoder_batch_norm_layer_number_1",
            "encoder_conv_layer_number_2",
            "encoder_batch_norm_layer_number_2",
            "encoder_flatten",
            "encoder_output",
        ]
    );

    // The first block is named with index 1; no layer is ever numbered 0.
    assert!(names.iter().all(|n| !n.ends_with("_0")));

    // Names also exist as graph node names, for debugging.
    let graph = ae.encoder().graph();
    assert!(graph
        .nodes
        .values()
        .any(|n| n.name.as_deref() == Some("encoder_conv_layer_number_1")));
}

#[test]
fn unequal_sequence_lengths_are_rejected() {
    let err = Autoencoder::new(
        (28, 28, 1),
        vec![32, 64],
        vec![3],
        vec![1, 2],
        2,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ModelError::MismatchedLayerConfig {
            filters: 2,
            kernels: 1,
            strides: 2,
        }
    );

    // No silent truncation in the other direction either.
    let err = Autoencoder::new(
        (28, 28, 1),
        vec![32],
        vec![3, 3],
        vec![1],
        2,
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::MismatchedLayerConfig { .. }));
}

#[test]
fn builder_results_are_debug_formattable() {
    // Both arms of the builder's Result must support `{:?}`, so tests and
    // callers can use unwrap_err/expect on it.
    let built = Autoencoder::new((28, 28, 1), vec![32], vec![3], vec![1], 2);
    assert!(format!("{:?}", built).contains("Autoencoder"));

    let failed = Autoencoder::new((28, 28, 1), vec![32], vec![3, 3], vec![1], 2);
    assert!(format!("{:?}", failed).contains("MismatchedLayerConfig"));
}

#[test]
fn empty_layer_stack_is_rejected() {
    let err = Autoencoder::new((28, 28, 1), vec![], vec![], vec![], 2).unwrap_err();
    assert_eq!(err, ModelError::EmptyLayerStack);
}

#[test]
fn reference_configuration_builds_expected_encoder() {
    let ae = reference_encoder();

    assert_eq!(ae.input_shape(), (28, 28, 1));
    assert_eq!(ae.conv_filters(), &[32]);
    assert_eq!(ae.conv_kernels(), &[3]);
    assert_eq!(ae.conv_strides(), &[1]);
    assert_eq!(ae.latent_space_dim(), 2);

    // One conv block, named with suffix 1.
    let conv: Vec<_> = ae
        .encoder()
        .layers()
        .iter()
        .filter(|r| r.kind == LayerKind::Conv2d)
        .collect();
    assert_eq!(conv.len(), 1);
    assert_eq!(conv[0].name, "encoder_conv_layer_number_1");

    // 'same' padding at stride 1 preserves the spatial size.
    assert_eq!(ae.shape_before_bottleneck(), &vec![32, 28, 28]);
    assert_eq!(ae.encoder().output_shape(), &vec![1, 2]);

    // The graph's registered input and output are the ones the model reports.
    let graph = ae.encoder().graph();
    assert_eq!(graph.inputs, vec![ae.encoder().input_node()]);
    assert_eq!(graph.outputs, vec![ae.encoder().output_node()]);
}

#[test]
fn summary_lists_every_layer_with_shapes_and_params() {
    let ae = reference_encoder();
    let summary = ae.encoder().summary_string();

    assert!(summary.contains("Model: \"encoder\""));
    assert!(summary.contains("encoder_input (Input)"));
    assert!(summary.contains("encoder_conv_layer_number_1 (Conv2D)"));
    assert!(summary.contains("encoder_batch_norm_layer_number_1 (BatchNorm)"));
    assert!(summary.contains("encoder_flatten (Flatten)"));
    assert!(summary.contains("encoder_output (Dense)"));
    assert!(summary.contains("[1, 32, 28, 28]"));
    assert!(summary.contains("[1, 2]"));

    // conv: 32*1*3*3 + 32 = 320 scalar parameters
    assert!(summary.contains("320"));

    // conv (320) + batchnorm (32 + 32) + dense (25088*2 + 2)
    assert_eq!(ae.encoder().num_parameters(), 320 + 64 + 28 * 28 * 32 * 2 + 2);
}

#[test]
fn initial_parameter_buffers_match_declared_shapes() {
    use convae::asg::Value;

    let ae = reference_encoder();
    let buffers = ae.encoder().init_parameters();

    assert_eq!(buffers.len(), ae.encoder().parameter_shapes().len());
    for (name, shape) in ae.encoder().parameter_shapes() {
        match buffers.get(name) {
            Some(Value::Tensor(arr)) => assert_eq!(arr.shape(), shape.as_slice(), "{}", name),
            other => panic!("missing or non-tensor buffer for {}: {:?}", name, other),
        }
    }
}

#[test]
fn built_graph_survives_json_round_trip() {
    let ae = reference_encoder();
    let graph = ae.encoder().graph();

    let json = serde_json::to_string(graph).expect("graph must serialize");
    let restored: convae::asg::Asg = serde_json::from_str(&json).expect("graph must deserialize");

    assert_eq!(restored.nodes.len(), graph.nodes.len());
    assert_eq!(restored.outputs, graph.outputs);
}
