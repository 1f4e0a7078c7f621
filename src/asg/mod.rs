//! ASG: Абстрактный семантический граф.
//!
//! Граф — это единственная структура данных, которой владеет построитель
//! модели. Слои не хранят реальных чисел: каждый слой лишь добавляет в граф
//! узлы-операции и узлы-параметры. После построения граф иммутабелен.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Идентификатор узла.
pub type NodeId = usize;
/// Идентификатор графа.
pub type AsgId = usize;
/// Форма тензора.
pub type Shape = Vec<usize>;

pub type AsgResult<T> = std::result::Result<T, AsgError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AsgError {
    #[error("Узел с ID {0} не найден")]
    NodeNotFound(NodeId),
}

/// Режим паддинга для свёртки (семантика как в Keras).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    /// Без паддинга: выходной размер равен `(in - k) / stride + 1`.
    Valid,
    /// Паддинг, сохраняющий пространственный размер при stride = 1;
    /// при stride > 1 выходной размер равен `ceil(in / stride)`.
    Same,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// ID узла (дублируем ключ HashMap для удобства вызовов в других модулях).
    pub id: NodeId,
    pub name: Option<String>,
    pub node_type: NodeType,
    /// Форма выходного тензора; заполняется проходом shape inference.
    pub shape: Option<Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeType {
    // Данные
    Input { name: String },
    Parameter { name: String },
    Literal(Value),

    // Бинарные (поэлементные, с broadcast)
    Add(NodeId, NodeId),
    Subtract(NodeId, NodeId),
    Multiply(NodeId, NodeId),
    Divide(NodeId, NodeId),
    MatrixMultiply(NodeId, NodeId),

    // Унарные
    Sqrt(NodeId),
    ReLU(NodeId),

    // Редукции (по последней оси, keepdim=1)
    Mean(NodeId),
    Variance(NodeId),

    // Трансформации
    /// Сворачивает все оси, кроме батчевой, в одну: `[N, ...] -> [N, prod(...)]`.
    Flatten(NodeId),

    // Свёртка: input [N, C_in, H, W], weight [C_out, C_in, kH, kW]
    Conv2d {
        input: NodeId,
        weight: NodeId,
        bias: Option<NodeId>,
        stride: (usize, usize),
        padding: Padding,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Tensor(ArrayD<f32>),
    ScalarF32(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asg {
    pub id: AsgId,
    pub nodes: HashMap<NodeId, Node>,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
}

impl Asg {
    pub fn new(id: AsgId) -> Self {
        Self { id, nodes: HashMap::new(), inputs: vec![], outputs: vec![] }
    }

    pub fn add_node(&mut self, name: Option<String>, node_type: NodeType) -> NodeId {
        let new_id = self.nodes.len();
        let mut node = Node { id: new_id, name, node_type, shape: None };

        // Автопроставление формы для литералов, чтобы инференс не падал
        // на MissingShapeInfo.
        match &node.node_type {
            NodeType::Literal(Value::Tensor(arr)) => {
                node.shape = Some(arr.shape().to_vec());
            }
            NodeType::Literal(Value::ScalarF32(_)) => {
                node.shape = Some(vec![]);
            }
            _ => {}
        }

        self.nodes.insert(new_id, node);
        new_id
    }

    pub fn set_outputs(&mut self, outputs: Vec<NodeId>) {
        self.outputs = outputs;
    }

    /// Шорткат для графов с единственным выходом.
    pub fn set_output(&mut self, output: NodeId) {
        self.set_outputs(vec![output]);
    }

    pub fn get_node(&self, id: NodeId) -> AsgResult<&Node> {
        self.nodes.get(&id).ok_or(AsgError::NodeNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::ArrayD;

    #[test]
    fn new_graph_is_empty() {
        let asg = Asg::new(0);
        assert_eq!(asg.id, 0);
        assert!(asg.nodes.is_empty());
        assert!(asg.inputs.is_empty());
        assert!(asg.outputs.is_empty());
    }

    #[test]
    fn literal_nodes_get_their_shape_on_insertion() {
        let mut asg = Asg::new(0);

        let tensor_id = asg.add_node(
            None,
            NodeType::Literal(Value::Tensor(ArrayD::zeros(ndarray::IxDyn(&[2, 3])))),
        );
        let scalar_id = asg.add_node(None, NodeType::Literal(Value::ScalarF32(1e-5)));

        assert_eq!(asg.get_node(tensor_id).unwrap().shape, Some(vec![2, 3]));
        assert_eq!(asg.get_node(scalar_id).unwrap().shape, Some(vec![]));
    }
}
