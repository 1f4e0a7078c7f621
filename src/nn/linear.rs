//! Модуль, реализующий полносвязный (линейный) слой в графовой парадигме.

use crate::asg::Shape;
use crate::nn::module::Module;
use crate::tensor::{GraphContext, Tensor};
use std::cell::RefCell;
use std::rc::Rc;

/// Полносвязный (линейный) слой.
///
/// В графовой архитектуре этот слой не хранит реальных данных. Вместо этого
/// он владеет символьными `Tensor`-дескрипторами, которые представляют его
/// веса (`weights`) и смещения (`bias`) как узлы `Parameter` в ASG.
///
/// Метод `forward` добавляет в граф операции, соответствующие формуле `y = xW + b`.
pub struct Linear {
    /// Символьный дескриптор для тензора весов.
    pub weights: Tensor,
    /// Символьный дескриптор для тензора смещений.
    pub bias: Tensor,
    /// Количество входных признаков.
    pub in_features: usize,
    /// Количество выходных признаков.
    pub out_features: usize,
    /// Базовое имя слоя.
    pub name: String,
}

impl Linear {
    /// Создает новый полносвязный слой, регистрируя его параметры в графе.
    ///
    /// # Аргументы
    ///
    /// * `context` - Ссылка на `GraphContext`, в котором будет строиться граф.
    /// * `name` - Базовое имя для этого слоя, чтобы параметры имели уникальные
    ///   имена в графе (например, "encoder_output.weights").
    /// * `in_features` - Количество входных признаков.
    /// * `out_features` - Количество выходных признаков.
    pub fn new(
        context: &Rc<RefCell<GraphContext>>,
        name: &str,
        in_features: usize,
        out_features: usize,
    ) -> Self {
        let weights_name = format!("{}.weights", name);
        let bias_name = format!("{}.bias", name);

        let weights = Tensor::new_parameter(context, &weights_name);
        let bias = Tensor::new_parameter(context, &bias_name);

        Self {
            weights,
            bias,
            in_features,
            out_features,
            name: name.to_string(),
        }
    }

    /// Имена и формы параметров слоя: веса `[in, out]`, смещение `[1, out]`.
    pub fn parameter_shapes(&self) -> Vec<(String, Shape)> {
        vec![
            (
                format!("{}.weights", self.name),
                vec![self.in_features, self.out_features],
            ),
            (format!("{}.bias", self.name), vec![1, self.out_features]),
        ]
    }
}

impl Module for Linear {
    /// Добавляет в граф операции для прямого прохода через линейный слой.
    ///
    /// Конструирует подграф, соответствующий `inputs.dot(weights) + bias`.
    fn forward(&self, inputs: &Tensor) -> Tensor {
        let dot_product = inputs.dot(&self.weights);
        &dot_product + &self.bias
    }

    /// Возвращает список символьных дескрипторов для обучаемых параметров слоя.
    fn parameters(&self) -> Vec<Tensor> {
        vec![self.weights.clone(), self.bias.clone()]
    }
}
