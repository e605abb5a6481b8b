//! Sums of dielectric-function dispersions.
//!
//! Oscillator models add in $\epsilon$: a Sellmeier background plus a
//! second Sellmeier term set is a valid model. Sums stay flat, so
//! `(a + b) + c` holds three members, not a nested sum.

use std::ops::Add;
use std::sync::Arc;

use num_complex::Complex64;

use crate::dispersion::{Dispersion, MaterialError, Parameterisation};
use crate::formulas::{Cauchy, ConstantIndex, Sellmeier};
use crate::table::TabulatedIndex;

/// $\epsilon(\lambda) = \sum_i \epsilon_i(\lambda)$.
#[derive(Clone)]
pub struct DispersionSum {
    name: String,
    members: Vec<Arc<dyn Dispersion>>,
}

impl DispersionSum {
    /// Fails unless every member is a dielectric-function model. Nested
    /// sums are flattened.
    pub fn new(members: Vec<Arc<dyn Dispersion>>) -> Result<Self, MaterialError> {
        let mut flat: Vec<Arc<dyn Dispersion>> = Vec::with_capacity(members.len());
        for member in members {
            match member.summands() {
                Some(inner) => flat.extend(inner.iter().cloned()),
                None => flat.push(member),
            }
        }
        check_summable(&flat)?;

        let name = flat.iter().map(|d| d.name()).collect::<Vec<_>>().join(" + ");
        Ok(Self { name, members: flat })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn members(&self) -> &[Arc<dyn Dispersion>] {
        &self.members
    }
}

fn check_summable(members: &[Arc<dyn Dispersion>]) -> Result<(), MaterialError> {
    let count = |kind: Parameterisation| members.iter().filter(|d| d.parameterisation() == kind).count();
    let tabulated = count(Parameterisation::Tabulated);
    let index = count(Parameterisation::RefractiveIndex);

    if tabulated > 0 {
        return Err(MaterialError::UnsupportedSum(
            "Adding of tabular dispersions is not supported".into(),
        ));
    }
    if index == members.len() {
        return Err(MaterialError::UnsupportedSum(
            "Adding of index based dispersions is not supported".into(),
        ));
    }
    if index > 0 {
        return Err(MaterialError::UnsupportedSum(
            "Cannot add refractive index and dielectric function based dispersions".into(),
        ));
    }
    Ok(())
}

impl std::fmt::Debug for DispersionSum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispersionSum")
            .field("name", &self.name)
            .field("members", &self.members.len())
            .finish()
    }
}

impl Dispersion for DispersionSum {
    fn name(&self) -> &str {
        &self.name
    }

    /// Intersection of the member ranges.
    fn wavelength_range(&self) -> Option<(f64, f64)> {
        self.members
            .iter()
            .filter_map(|d| d.wavelength_range())
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.max(lo_b), hi_a.min(hi_b)))
    }

    fn summands(&self) -> Option<&[Arc<dyn Dispersion>]> {
        Some(&self.members)
    }

    fn dielectric_function(&self, wavelength_nm: f64) -> Result<Complex64, MaterialError> {
        self.members
            .iter()
            .map(|d| d.dielectric_function(wavelength_nm))
            .sum()
    }
}

macro_rules! impl_add {
    ($($ty:ty),*) => {$(
        impl<D: Dispersion + 'static> Add<D> for $ty {
            type Output = Result<DispersionSum, MaterialError>;

            fn add(self, rhs: D) -> Self::Output {
                let members: Vec<Arc<dyn Dispersion>> = vec![Arc::new(self), Arc::new(rhs)];
                DispersionSum::new(members)
            }
        }
    )*};
}

impl_add!(ConstantIndex, Sellmeier, Cauchy, TabulatedIndex, DispersionSum);
