//! CF conventions decoding of packed and masked variables
//!
//! Opening a dataset without strict types decodes every numeric variable that carries
//! `scale_factor`, `add_offset`, `_FillValue`, or `missing_value`: fill values become `NaN`
//! and packed values are unpacked to `f64` as `value * scale_factor + add_offset`. The
//! attributes that drove the decoding are removed from the variable.

use super::{Dataset, Values, Variable};

const PACKING: [&str; 4] = ["scale_factor", "add_offset", "_FillValue", "missing_value"];

/// decode every packed or masked variable of `dataset` in place
pub fn decode(mut dataset: Dataset) -> Dataset {
    for var in dataset.variables_mut() {
        decode_variable(var);
    }
    dataset
}

fn decode_variable(var: &mut Variable) {
    if var.values().is_text() || !PACKING.iter().any(|name| var.attribute(name).is_some()) {
        return;
    }

    let fills: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| var.attribute(name))
        .filter_map(|att| att.value.to_f64())
        .flatten()
        .collect();
    let scale = var.attribute_f64("scale_factor").unwrap_or(1.0);
    let offset = var.attribute_f64("add_offset").unwrap_or(0.0);

    let raw = match var.values().to_f64() {
        Some(raw) => raw,
        None => return,
    };

    let decoded = raw
        .into_iter()
        .map(|x| {
            if fills.iter().any(|fill| *fill == x) {
                f64::NAN
            } else {
                x * scale + offset
            }
        })
        .collect();

    log::debug!("decoded packed or masked variable `{}`", var.name());
    var.replace_values(Values::Double(decoded));
    for name in PACKING {
        var.remove_attribute(name);
    }
}
