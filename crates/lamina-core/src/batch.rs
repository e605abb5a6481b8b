//! Wavelength batch evaluation.
//!
//! Every wavelength of a solve is independent of every other one, so the
//! batch is mapped either serially or on the rayon pool. Output order always
//! follows input order, and the first failure aborts the whole batch.

use rayon::prelude::*;

/// Map `f` over `wavelengths`, collecting into a vector in input order.
pub fn map_wavelengths<T, E, F>(wavelengths: &[f64], parallel: bool, f: F) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(f64) -> Result<T, E> + Send + Sync,
{
    if parallel && wavelengths.len() > 1 {
        wavelengths.par_iter().map(|&wl| f(wl)).collect()
    } else {
        wavelengths.iter().map(|&wl| f(wl)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_and_serial_agree() {
        let wavelengths: Vec<f64> = (0..64).map(|i| 400.0 + i as f64).collect();
        let square = |wl: f64| Ok::<f64, ()>(wl * wl);
        let serial = map_wavelengths(&wavelengths, false, square).unwrap();
        let parallel = map_wavelengths(&wavelengths, true, square).unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_failure_aborts_batch() {
        let wavelengths = [400.0, 500.0, 600.0];
        let result = map_wavelengths(&wavelengths, true, |wl| {
            if wl > 550.0 {
                Err(format!("bad {wl}"))
            } else {
                Ok(wl)
            }
        });
        assert_eq!(result, Err("bad 600".to_string()));
    }
}
