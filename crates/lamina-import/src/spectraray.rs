//! Parser for SpectraRay ASCII exports.
//!
//! ψ/Δ exports carry the angles of incidence in the header line, at the
//! third, fifth, … fields, followed by one row per wavelength:
//! ```text
//! <label> <label> 70.0 <label> 75.0
//! 400.0 ψ₁ Δ₁ ψ₂ Δ₂
//! 401.0 ψ₁ Δ₁ ψ₂ Δ₂
//! ...
//! ```
//!
//! Δ values above 180° are mapped to $(-180°, 180°]$.
//!
//! Mueller-matrix exports have a header row and the wavelength in the first
//! column; the sixteen elements `M11 … M44` are the sixteen columns before the
//! last one.

use std::path::Path;

use super::{Delimiters, MuellerRecord, ParseError, PsiDeltaRecord, RhoRecord};

/// Data columns occupied by a Mueller matrix plus the trailing column.
const MUELLER_TAIL: usize = 17;

/// Parse a ψ/Δ export, sorted by angle of incidence then wavelength.
pub fn read_psi_delta(content: &str, delimiters: Delimiters) -> Result<Vec<PsiDeltaRecord>, ParseError> {
    let mut lines = content.lines().enumerate();
    let header = lines.next().map(|(_, line)| line).ok_or_else(|| ParseError::Format {
        line: 1,
        message: "File is empty".into(),
    })?;

    let angles: Vec<f64> = delimiters
        .fields(header)
        .iter()
        .skip(2)
        .step_by(2)
        .map(|field| delimiters.number(field, 1))
        .collect::<Result<_, _>>()?;
    if angles.is_empty() {
        return Err(ParseError::Format {
            line: 1,
            message: "Header lists no angles of incidence".into(),
        });
    }

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields = delimiters.fields(line);
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 1 + 2 * angles.len() {
            return Err(ParseError::Format {
                line: line_no,
                message: format!(
                    "Expected wavelength and {} ψ/Δ pairs, got {} fields",
                    angles.len(),
                    fields.len()
                ),
            });
        }
        let wavelength_nm = delimiters.number(fields[0], line_no)?;
        for (k, &angle_deg) in angles.iter().enumerate() {
            let psi_deg = delimiters.number(fields[1 + 2 * k], line_no)?;
            let delta_deg = delimiters.number(fields[2 + 2 * k], line_no)?;
            records.push(PsiDeltaRecord {
                angle_deg,
                wavelength_nm,
                psi_deg,
                delta_deg: if delta_deg > 180.0 { delta_deg - 360.0 } else { delta_deg },
            });
        }
    }

    records.sort_by(|a, b| {
        a.angle_deg
            .total_cmp(&b.angle_deg)
            .then(a.wavelength_nm.total_cmp(&b.wavelength_nm))
    });
    log::debug!(
        "Read {} ψ/Δ records at {} angle(s) of incidence",
        records.len(),
        angles.len()
    );
    Ok(records)
}

/// Parse a ψ/Δ export into $\rho = \tan\psi \, e^{i\Delta}$.
pub fn read_rho(content: &str, delimiters: Delimiters) -> Result<Vec<RhoRecord>, ParseError> {
    Ok(read_psi_delta(content, delimiters)?
        .iter()
        .map(|record| RhoRecord {
            angle_deg: record.angle_deg,
            wavelength_nm: record.wavelength_nm,
            rho: record.rho(),
        })
        .collect())
}

/// Parse a Mueller-matrix export.
pub fn read_mueller_matrix(content: &str, delimiters: Delimiters) -> Result<Vec<MuellerRecord>, ParseError> {
    let mut records = Vec::new();
    // Line 1 is the column header (ignored)
    for (idx, line) in content.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        let fields = delimiters.fields(line);
        if fields.is_empty() {
            continue;
        }
        let data = &fields[1..];
        if data.len() < MUELLER_TAIL {
            return Err(ParseError::Format {
                line: line_no,
                message: format!(
                    "Expected at least {} data columns after the wavelength, got {}",
                    MUELLER_TAIL,
                    data.len()
                ),
            });
        }
        let wavelength_nm = delimiters.number(fields[0], line_no)?;
        let elements = &data[data.len() - MUELLER_TAIL..data.len() - 1];
        let mut matrix = [[0.0; 4]; 4];
        for (k, field) in elements.iter().enumerate() {
            matrix[k / 4][k % 4] = delimiters.number(field, line_no)?;
        }
        records.push(MuellerRecord {
            wavelength_nm,
            elements: matrix,
        });
    }
    Ok(records)
}

pub fn read_psi_delta_file(path: impl AsRef<Path>, delimiters: Delimiters) -> Result<Vec<PsiDeltaRecord>, ParseError> {
    read_psi_delta(&std::fs::read_to_string(path)?, delimiters)
}

pub fn read_rho_file(path: impl AsRef<Path>, delimiters: Delimiters) -> Result<Vec<RhoRecord>, ParseError> {
    read_rho(&std::fs::read_to_string(path)?, delimiters)
}

pub fn read_mueller_matrix_file(
    path: impl AsRef<Path>,
    delimiters: Delimiters,
) -> Result<Vec<MuellerRecord>, ParseError> {
    read_mueller_matrix(&std::fs::read_to_string(path)?, delimiters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{angles, at_angle};
    use approx::assert_abs_diff_eq;

    const PSI_DELTA: &str = "\
SpectraRay psi 70.0 delta 75.0
500.0 20.0 100.0 25.0 190.0
400.0 21.0 270.0 26.0 -10.0
";

    #[test]
    fn test_psi_delta_is_sorted_and_wrapped() {
        let records = read_psi_delta(PSI_DELTA, Delimiters::default()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(angles(&records), vec![70.0, 75.0]);

        let first = at_angle(&records, 70.0, 1e-9);
        assert_eq!(first[0].wavelength_nm, 400.0);
        assert_eq!(first[0].delta_deg, -90.0);
        assert_eq!(first[1].delta_deg, 100.0);

        let second = at_angle(&records, 75.0, 1e-9);
        assert_eq!(second[1].delta_deg, -170.0);
        assert_eq!(second[0].delta_deg, -10.0);
    }

    #[test]
    fn test_decimal_comma_and_custom_separator() {
        let content = "a;b;65,5\n632,8;30,0;45,0\n";
        let delimiters = Delimiters {
            separator: Some(';'),
            decimal: ',',
        };
        let records = read_psi_delta(content, delimiters).unwrap();
        assert_eq!(records.len(), 1);
        assert_abs_diff_eq!(records[0].angle_deg, 65.5);
        assert_abs_diff_eq!(records[0].wavelength_nm, 632.8);
    }

    #[test]
    fn test_rho_from_psi_delta() {
        let records = read_rho("x x 70\n500 45 90\n", Delimiters::default()).unwrap();
        assert_abs_diff_eq!(records[0].rho.re, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(records[0].rho.im, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_short_row_reports_line() {
        let err = read_psi_delta("x x 70 y 75\n500 1 2 3\n", Delimiters::default()).unwrap_err();
        match err {
            ParseError::Format { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Format error, got {other}"),
        }
    }

    #[test]
    fn test_mueller_columns_before_last() {
        let header = "lambda extra m11 m12 m13 m14 m21 m22 m23 m24 m31 m32 m33 m34 m41 m42 m43 m44 info";
        let values: Vec<String> = (1..=16).map(|v| v.to_string()).collect();
        let content = format!("{header}\n600 99 {} 0\n", values.join(" "));
        let records = read_mueller_matrix(&content, Delimiters::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].wavelength_nm, 600.0);
        assert_eq!(records[0].elements[0], [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(records[0].elements[3][3], 16.0);
    }

    #[test]
    fn test_mueller_row_too_short() {
        let err = read_mueller_matrix("h\n600 1 2 3\n", Delimiters::default()).unwrap_err();
        assert!(matches!(err, ParseError::Format { line: 2, .. }));
    }
}
