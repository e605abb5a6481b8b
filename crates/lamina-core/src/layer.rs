//! Layers and periodic layer blocks.
//!
//! A [`Layer`] is a homogeneous slab of finite thickness. A
//! [`RepeatedLayers`] block is a periodic super-layer that may start and end
//! part-way through its period:
//!
//! ```text
//! period = [A, B, C], front_partial = 1, repeat_count = 2, back_partial = 2
//! expands to  C | A B C | A B C | A B
//! ```

use std::sync::Arc;

use lamina_materials::OpticalMaterial;

use crate::error::OpticsError;
use crate::units::Length;

/// One homogeneous slab.
#[derive(Clone)]
pub struct Layer {
    material: Arc<dyn OpticalMaterial>,
    thickness: Length,
}

impl Layer {
    /// Fails with [`OpticsError::InvalidThickness`] unless the thickness is
    /// finite and strictly positive.
    pub fn new(material: Arc<dyn OpticalMaterial>, thickness: Length) -> Result<Self, OpticsError> {
        let thickness_m = thickness.metres();
        if !thickness_m.is_finite() || thickness_m <= 0.0 {
            return Err(OpticsError::InvalidThickness { thickness_m });
        }
        Ok(Self {
            material,
            thickness,
        })
    }

    pub fn material(&self) -> &Arc<dyn OpticalMaterial> {
        &self.material
    }

    pub fn thickness(&self) -> Length {
        self.thickness
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("material", &self.material.name())
            .field("thickness_nm", &self.thickness.nanometres())
            .finish()
    }
}

/// A periodic block of layers.
#[derive(Debug, Clone)]
pub struct RepeatedLayers {
    period: Vec<Layer>,
    repeat_count: usize,
    front_partial: usize,
    back_partial: usize,
}

impl RepeatedLayers {
    /// `front_partial` trailing layers of the period, then `repeat_count` full
    /// periods, then `back_partial` leading layers of the period.
    pub fn new(
        period: Vec<Layer>,
        repeat_count: usize,
        front_partial: usize,
        back_partial: usize,
    ) -> Result<Self, OpticsError> {
        if period.is_empty() {
            return Err(OpticsError::InvalidRepeat("the period holds no layers".into()));
        }
        let period_len = period.len();
        if front_partial > period_len {
            return Err(OpticsError::PartialOutOfRange {
                side: "front",
                value: front_partial,
                period_len,
            });
        }
        if back_partial > period_len {
            return Err(OpticsError::PartialOutOfRange {
                side: "back",
                value: back_partial,
                period_len,
            });
        }
        Ok(Self {
            period,
            repeat_count,
            front_partial,
            back_partial,
        })
    }

    pub fn period(&self) -> &[Layer] {
        &self.period
    }

    pub fn repeat_count(&self) -> usize {
        self.repeat_count
    }

    pub fn front_partial(&self) -> usize {
        self.front_partial
    }

    pub fn back_partial(&self) -> usize {
        self.back_partial
    }

    /// Layers placed before the full periods.
    pub fn front_layers(&self) -> &[Layer] {
        &self.period[self.period.len() - self.front_partial..]
    }

    /// Layers placed after the full periods.
    pub fn back_layers(&self) -> &[Layer] {
        &self.period[..self.back_partial]
    }

    /// Number of elementary layers this block expands to.
    pub fn layer_count(&self) -> usize {
        self.front_partial + self.repeat_count * self.period.len() + self.back_partial
    }

    /// Elementary layers in propagation order.
    pub fn expand(&self) -> impl Iterator<Item = &Layer> + '_ {
        let periods = (0..self.repeat_count).flat_map(move |_| self.period.iter());
        self.front_layers()
            .iter()
            .chain(periods)
            .chain(self.back_layers().iter())
    }
}

/// An element of a structure's layer sequence.
#[derive(Debug, Clone)]
pub enum StackElement {
    Layer(Layer),
    Repeated(RepeatedLayers),
}

impl StackElement {
    pub fn layer_count(&self) -> usize {
        match self {
            StackElement::Layer(_) => 1,
            StackElement::Repeated(block) => block.layer_count(),
        }
    }

    /// Elementary layers in propagation order.
    pub fn layers(&self) -> Box<dyn Iterator<Item = &Layer> + '_> {
        match self {
            StackElement::Layer(layer) => Box::new(std::iter::once(layer)),
            StackElement::Repeated(block) => Box::new(block.expand()),
        }
    }
}

impl From<Layer> for StackElement {
    fn from(layer: Layer) -> Self {
        StackElement::Layer(layer)
    }
}

impl From<RepeatedLayers> for StackElement {
    fn from(block: RepeatedLayers) -> Self {
        StackElement::Repeated(block)
    }
}

/// Physical thickness of a quarter-wave layer, $\lambda_0 / (4\,\mathrm{Re}\,n(\lambda_0))$.
pub fn quarter_wave_thickness(
    material: &dyn OpticalMaterial,
    lambda0_nm: f64,
) -> Result<Length, OpticsError> {
    let n = material
        .refractive_index(lambda0_nm)?
        .ok_or_else(|| OpticsError::AnisotropicMaterial {
            solver: "quarter-wave",
            material: material.name().to_string(),
        })?;
    Ok(Length::nm(lambda0_nm / (4.0 * n.re)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_materials::formulas::ConstantIndex;
    use lamina_materials::IsotropicMaterial;

    fn material(n: f64) -> Arc<dyn OpticalMaterial> {
        Arc::new(IsotropicMaterial::from_dispersion(ConstantIndex::real(n)))
    }

    fn layer(n: f64, d_nm: f64) -> Layer {
        Layer::new(material(n), Length::nm(d_nm)).unwrap()
    }

    #[test]
    fn test_non_positive_thickness_is_rejected() {
        for d in [0.0, -5.0, f64::NAN] {
            let err = Layer::new(material(1.5), Length::nm(d)).unwrap_err();
            assert!(matches!(err, OpticsError::InvalidThickness { .. }));
        }
    }

    #[test]
    fn test_layer_count_and_expansion_order() {
        let block = RepeatedLayers::new(
            vec![layer(1.1, 10.0), layer(1.2, 20.0), layer(1.3, 30.0)],
            2,
            1,
            2,
        )
        .unwrap();
        assert_eq!(block.layer_count(), 1 + 6 + 2);

        let thicknesses: Vec<f64> = block
            .expand()
            .map(|l| l.thickness().nanometres().round())
            .collect();
        assert_eq!(
            thicknesses,
            vec![30.0, 10.0, 20.0, 30.0, 10.0, 20.0, 30.0, 10.0, 20.0]
        );
    }

    #[test]
    fn test_partials_outside_period_fail() {
        let period = vec![layer(1.1, 10.0), layer(1.2, 20.0)];
        let err = RepeatedLayers::new(period.clone(), 3, 3, 0).unwrap_err();
        assert!(matches!(
            err,
            OpticsError::PartialOutOfRange { side: "front", value: 3, period_len: 2 }
        ));
        let err = RepeatedLayers::new(period.clone(), 3, 0, 5).unwrap_err();
        assert!(matches!(err, OpticsError::PartialOutOfRange { side: "back", .. }));
        // The bounds themselves are valid.
        assert!(RepeatedLayers::new(period, 0, 2, 2).is_ok());
    }

    #[test]
    fn test_empty_period_is_rejected() {
        assert!(matches!(
            RepeatedLayers::new(Vec::new(), 1, 0, 0),
            Err(OpticsError::InvalidRepeat(_))
        ));
    }

    #[test]
    fn test_quarter_wave_thickness() {
        let d = quarter_wave_thickness(material(1.5).as_ref(), 600.0).unwrap();
        assert!((d.nanometres() - 100.0).abs() < 1e-9);
    }
}
