use ndarray::{NdFloat, ScalarOperand};

use num_traits::{FromPrimitive, Signed};

use std::iter::Sum;

// Include submodules
mod common;
mod distance;
mod scaler;

// Re-export types from submodules
pub use common::DataPoint;
pub use distance::{Distance, L1Dist, L2Dist, LInfDist};
pub use scaler::{ScalerError, ScalerParams, StandardScaler};

pub trait Float: NdFloat + FromPrimitive + Signed + Sum + ScalarOperand {}

impl Float for f32 {}

impl Float for f64 {}
