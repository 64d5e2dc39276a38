// ============================================================
// Layer 5 — ReLU Net
// ============================================================
// Linear projection followed by a ReLU. Every projection in the
// model (pre-projections, fusion branches, attention branches and
// the first classifier stage) is one of these.

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::activation::relu,
};

#[derive(Config, Debug)]
pub struct ReluNetConfig {
    pub d_input:  usize,
    pub d_output: usize,
}

impl ReluNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ReluNet<B> {
        ReluNet {
            linear: LinearConfig::new(self.d_input, self.d_output).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct ReluNet<B: Backend> {
    pub linear: Linear<B>,
}

impl<B: Backend> ReluNet<B> {
    /// Works on any rank; only the last dimension is projected.
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        relu(self.linear.forward(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn test_output_shape_and_non_negative() {
        let device = Default::default();
        let net = ReluNetConfig::new(8, 5).init::<TestBackend>(&device);

        let x = Tensor::<TestBackend, 3>::random([2, 3, 8], Distribution::Normal(0.0, 1.0), &device);
        let y = net.forward(x);

        assert_eq!(y.dims(), [2, 3, 5]);
        let values: Vec<f32> = y.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| v >= 0.0));
    }
}
