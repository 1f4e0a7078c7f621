//! BatchNormalization слой для графовой архитектуры.
//!
//! Реализует Batch Normalization с обучаемыми параметрами gamma/beta,
//! собранную из примитивных операций графа.

use crate::asg::Shape;
use crate::nn::Module;
use crate::tensor::{GraphContext, Tensor};
use std::cell::RefCell;
use std::rc::Rc;

/// Малая константа для численной стабильности.
const EPS: f32 = 1e-5;

/// Слой Batch Normalization.
///
/// Нормализует входные данные, применяя формулу:
/// `y = gamma * (x - mean) / sqrt(var + eps) + beta`
///
/// Параметры `gamma` и `beta` регистрируются с формой `[C, 1, 1]`, чтобы
/// broadcast распространял их по пространственным осям карты признаков
/// `[N, C, H, W]`.
pub struct BatchNorm {
    /// Обучаемый масштаб (scale).
    pub gamma: Tensor,
    /// Обучаемый сдвиг (shift).
    pub beta: Tensor,
    /// Константа epsilon для численной стабильности.
    eps: Tensor,
    /// Количество каналов нормализуемой карты признаков.
    pub num_features: usize,
    /// Имя слоя.
    pub name: String,
}

impl BatchNorm {
    /// Создаёт новый слой BatchNorm.
    ///
    /// # Аргументы
    /// * `ctx` - Контекст графа для регистрации параметров
    /// * `name` - Уникальное имя слоя
    /// * `num_features` - Количество каналов входа
    pub fn new(ctx: &Rc<RefCell<GraphContext>>, name: &str, num_features: usize) -> Self {
        let gamma_name = format!("{}.gamma", name);
        let beta_name = format!("{}.beta", name);

        let gamma = Tensor::new_parameter(ctx, &gamma_name);
        let beta = Tensor::new_parameter(ctx, &beta_name);
        let eps = Tensor::new_scalar(ctx, EPS, &format!("{}.eps", name));

        Self {
            gamma,
            beta,
            eps,
            num_features,
            name: name.to_string(),
        }
    }

    /// Имена и формы параметров слоя.
    pub fn parameter_shapes(&self) -> Vec<(String, Shape)> {
        vec![
            (format!("{}.gamma", self.name), vec![self.num_features, 1, 1]),
            (format!("{}.beta", self.name), vec![self.num_features, 1, 1]),
        ]
    }
}

impl Module for BatchNorm {
    /// Прямой проход BatchNorm.
    ///
    /// Использует статистики текущего батча; running statistics требуют
    /// инфраструктуры исполнения, которой в построителе графа нет.
    fn forward(&self, x: &Tensor) -> Tensor {
        let mean = x.mean();
        let x_minus_mean = x - &mean;

        let variance = x.variance();

        // Нормализуем
        let std = (&variance + &self.eps).sqrt();
        let normalized = &x_minus_mean / &std;

        // Применяем gamma и beta
        let scaled = &normalized * &self.gamma;
        &scaled + &self.beta
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![self.gamma.clone(), self.beta.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batchnorm_creation() {
        let ctx = Rc::new(RefCell::new(GraphContext::new()));
        let bn = BatchNorm::new(&ctx, "bn1", 32);

        assert_eq!(bn.name, "bn1");
        assert_eq!(bn.num_features, 32);
        assert_eq!(bn.parameters().len(), 2);
    }

    #[test]
    fn test_batchnorm_parameter_shapes() {
        let ctx = Rc::new(RefCell::new(GraphContext::new()));
        let bn = BatchNorm::new(&ctx, "bn1", 8);

        let shapes = bn.parameter_shapes();
        assert_eq!(shapes[0], ("bn1.gamma".to_string(), vec![8, 1, 1]));
        assert_eq!(shapes[1], ("bn1.beta".to_string(), vec![8, 1, 1]));
    }
}
