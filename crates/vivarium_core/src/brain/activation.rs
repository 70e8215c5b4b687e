use serde::{Deserialize, Serialize};

/// Activation function of a neuron.
///
/// The discriminant doubles as the index into [`ACTIVATION_TABLE`] and as the
/// heritable activation code carried by genes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ActivationKind {
    Identity = 0,
    Sigmoid = 1,
    #[default]
    Tanh = 2,
    Relu = 3,
    Step = 4,
    Sin = 5,
    Gaussian = 6,
    Abs = 7,
}

pub const ACTIVATION_KINDS: [ActivationKind; 8] = [
    ActivationKind::Identity,
    ActivationKind::Sigmoid,
    ActivationKind::Tanh,
    ActivationKind::Relu,
    ActivationKind::Step,
    ActivationKind::Sin,
    ActivationKind::Gaussian,
    ActivationKind::Abs,
];

pub type ActivationFn = fn(f64) -> f64;

pub const ACTIVATION_TABLE: [ActivationFn; 8] = [
    identity, sigmoid, tanh, relu, step, sin, gaussian, abs,
];

fn identity(x: f64) -> f64 {
    x
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x.clamp(-20.0, 20.0)).exp())
}

fn tanh(x: f64) -> f64 {
    x.clamp(-8.0, 8.0).tanh()
}

fn relu(x: f64) -> f64 {
    x.max(0.0)
}

fn step(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn sin(x: f64) -> f64 {
    x.sin()
}

fn gaussian(x: f64) -> f64 {
    (-(x * x)).exp()
}

fn abs(x: f64) -> f64 {
    x.abs()
}

impl ActivationKind {
    /// Resolves a gene activation code. Unknown or missing codes fall back to tanh.
    #[must_use]
    pub fn from_code(code: Option<i64>) -> Self {
        code.and_then(|c| usize::try_from(c).ok())
            .and_then(|c| ACTIVATION_KINDS.get(c).copied())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn code(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Relu => "relu",
            Self::Step => "step",
            Self::Sin => "sin",
            Self::Gaussian => "gaussian",
            Self::Abs => "abs",
        }
    }

    /// Applies the activation to a weighted sum.
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        ACTIVATION_TABLE[self as usize](x)
    }
}
