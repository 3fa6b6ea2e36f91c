//! Measured data attached to a process: a constant, a lookup table, a
//! symbolic expression or extended Arrhenius coefficients.

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::NumericDomainError;
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

/// A single value with its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    /// Unit of `value`
    pub unit: String,
    /// The value
    pub value: f64,
}

impl Constant {
    /// The constant value, independent of the input.
    pub fn evaluate(&self) -> f64 {
        self.value
    }
}

/// Two-column numeric table, e.g. energy against cross section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lut {
    /// Column labels
    pub labels: [String; 2],
    /// Column units
    pub units: [String; 2],
    /// Rows of `[x, y]`
    pub values: Vec<[f64; 2]>,
}

impl Lut {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First column.
    pub fn abscissae(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().map(|row| row[0])
    }

    /// Second column.
    pub fn ordinates(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().map(|row| row[1])
    }

    /// Check that the first column strictly increases.
    pub fn check_increasing(&self) -> Result<(), NumericDomainError> {
        match self.values.windows(2).position(|pair| pair[1][0] <= pair[0][0]) {
            Some(row) => Err(NumericDomainError::NotIncreasing { row: row + 1 }),
            None => Ok(()),
        }
    }

    /// Linear interpolation of the second column at `x`.
    pub fn interpolate(&self, x: f64) -> Result<f64, NumericDomainError> {
        let (first, last) = match (self.values.first(), self.values.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(NumericDomainError::EmptyTable),
        };
        self.check_increasing()?;

        if !x.is_finite() || x < first[0] || x > last[0] {
            return Err(NumericDomainError::OutOfRange {
                x,
                min: first[0],
                max: last[0],
            });
        }

        // Rows are strictly increasing, so the partition point is well defined.
        let upper = self.values.partition_point(|row| row[0] < x);
        if upper == 0 {
            return Ok(first[1]);
        }
        let [x0, y0] = self.values[upper - 1];
        let [x1, y1] = self.values[upper];
        Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
    }
}

/// Symbolic expression in terms of named parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expression {
    /// The expression text
    pub expression: String,
    /// Unit of the result
    pub unit: String,
    /// Free parameters of the expression, at least one
    pub parameters: Vec<String>,
}

/// Rate coefficient `a * T^b * exp(c / T)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtendedArrhenius {
    /// Pre-exponential factor
    pub a: f64,
    /// Temperature exponent
    pub b: f64,
    /// Activation temperature
    pub c: f64,
}

impl ExtendedArrhenius {
    /// Value at a single temperature.
    pub fn evaluate_at(&self, temperature: f64) -> Result<f64, NumericDomainError> {
        let exponent = if self.c == 0.0 {
            0.0
        } else if temperature == 0.0 {
            return Err(NumericDomainError::ZeroTemperature { c: self.c });
        } else {
            self.c / temperature
        };

        let value = self.a * temperature.powf(self.b) * exponent.exp();
        if value.is_finite() {
            Ok(value)
        } else {
            Err(NumericDomainError::NonFinite { input: temperature })
        }
    }

    /// Evaluate elementwise over a temperature sequence.
    pub fn evaluate(&self, temperatures: &[f64]) -> Result<Vec<f64>, NumericDomainError> {
        temperatures.iter().map(|&t| self.evaluate_at(t)).collect()
    }
}

/// Data of a process, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DataVariant {
    /// A single value
    Constant(Constant),
    /// A two-column table
    #[serde(rename = "LUT")]
    Lut(Lut),
    /// A symbolic expression
    Expression(Expression),
    /// Extended Arrhenius coefficients
    ExtendedArrhenius(ExtendedArrhenius),
}

impl DataVariant {
    /// Wire tag of this variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataVariant::Constant(_) => "Constant",
            DataVariant::Lut(_) => "LUT",
            DataVariant::Expression(_) => "Expression",
            DataVariant::ExtendedArrhenius(_) => "ExtendedArrhenius",
        }
    }

    /// The table, if this is a `LUT`.
    pub fn as_lut(&self) -> Option<&Lut> {
        match self {
            DataVariant::Lut(lut) => Some(lut),
            _ => None,
        }
    }
}

type ShapeDecoder = fn(&Map<String, Value>, &FieldPath, &mut Context<'_>) -> Option<DataVariant>;

/// Shapes in trial order for untagged payloads.
const SHAPES: [(&str, ShapeDecoder); 4] = [
    ("Constant", decode_constant),
    ("LUT", decode_lut),
    ("Expression", decode_expression),
    ("ExtendedArrhenius", decode_arrhenius),
];

fn decode_pair(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<[String; 2]> {
    let items = payload::array(value, path, ctx)?;
    if items.len() != 2 {
        ctx.structural(path, format!("expected exactly 2 entries, found {}", items.len()));
        return None;
    }
    let first = payload::non_empty_string(&items[0], &path.index(0), ctx);
    let second = payload::non_empty_string(&items[1], &path.index(1), ctx);
    Some([first?, second?])
}

fn decode_row(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<[f64; 2]> {
    let items = payload::array(value, path, ctx)?;
    if items.len() != 2 {
        ctx.structural(path, format!("expected exactly 2 columns, found {}", items.len()));
        return None;
    }
    let x = payload::number(&items[0], &path.index(0), ctx);
    let y = payload::number(&items[1], &path.index(1), ctx);
    Some([x?, y?])
}

fn decode_constant(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<DataVariant> {
    let unit = payload::required_string(map, "unit", path, ctx);
    let value = payload::required_number(map, "value", path, ctx);
    Some(DataVariant::Constant(Constant {
        unit: unit?,
        value: value?,
    }))
}

fn decode_lut(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<DataVariant> {
    let labels = payload::required(map, "labels", path, ctx).and_then(|v| decode_pair(v, &path.field("labels"), ctx));
    let units = payload::required(map, "units", path, ctx).and_then(|v| decode_pair(v, &path.field("units"), ctx));
    let values_path = path.field("values");
    let values = payload::required(map, "values", path, ctx)
        .and_then(|v| payload::array(v, &values_path, ctx))
        .and_then(|rows| payload::each(rows, &values_path, ctx, decode_row));
    Some(DataVariant::Lut(Lut {
        labels: labels?,
        units: units?,
        values: values?,
    }))
}

fn decode_expression(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<DataVariant> {
    let expression = payload::required_non_empty(map, "expression", path, ctx);
    let unit = payload::required_non_empty(map, "unit", path, ctx);
    let parameters_path = path.field("parameters");
    let parameters = payload::required(map, "parameters", path, ctx)
        .and_then(|v| payload::string_list(v, &parameters_path, ctx))
        .and_then(|parameters| {
            if parameters.is_empty() {
                ctx.structural(&parameters_path, "expression needs at least one parameter");
                None
            } else {
                Some(parameters)
            }
        });
    Some(DataVariant::Expression(Expression {
        expression: expression?,
        unit: unit?,
        parameters: parameters?,
    }))
}

fn decode_arrhenius(map: &Map<String, Value>, path: &FieldPath, ctx: &mut Context<'_>) -> Option<DataVariant> {
    let a = payload::required_number(map, "a", path, ctx);
    let b = payload::required_number(map, "b", path, ctx);
    let c = payload::required_number(map, "c", path, ctx);
    Some(DataVariant::ExtendedArrhenius(ExtendedArrhenius {
        a: a?,
        b: b?,
        c: c?,
    }))
}

impl FromPayload for DataVariant {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;

        if let Some(tag) = payload::optional(map, "type") {
            let tag = payload::string(tag, &path.field("type"), ctx)?;
            return match SHAPES.iter().find(|(name, _)| *name == tag) {
                Some((_, decode)) => decode(map, path, ctx),
                None => {
                    ctx.push(
                        &path.field("type"),
                        ErrorKind::UnknownVariant,
                        format!("unknown data type \"{}\"", tag),
                    );
                    None
                }
            };
        }

        for (_, decode) in SHAPES {
            let mark = ctx.error_count();
            match decode(map, path, ctx) {
                Some(data) if ctx.error_count() == mark => return Some(data),
                _ => ctx.rollback(mark),
            }
        }

        ctx.push(
            path,
            ErrorKind::AmbiguousOrInvalidData,
            "data matches none of Constant, LUT, Expression or ExtendedArrhenius",
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::validation::ValidationErrors;
    use serde_json::json;

    fn decode(value: Value) -> Result<DataVariant, ValidationErrors> {
        let config = ValidationConfig::default();
        let mut ctx = Context::new(&config);
        let decoded = DataVariant::from_payload(&value, &FieldPath::root(), &mut ctx);
        ctx.finish(decoded)
    }

    fn table(values: Vec<[f64; 2]>) -> Lut {
        Lut {
            labels: ["Energy".to_string(), "Cross Section".to_string()],
            units: ["eV".to_string(), "m^2".to_string()],
            values,
        }
    }

    #[test]
    fn test_untagged_trial_order() {
        let data = decode(json!({ "unit": "m^3/s", "value": 1e-15 })).unwrap();
        assert_eq!(data.type_name(), "Constant");

        let data = decode(json!({ "a": 1.0, "b": 0.5, "c": -300.0 })).unwrap();
        assert_eq!(data.type_name(), "ExtendedArrhenius");

        let data = decode(json!({ "expression": "k0*exp(-E/T)", "unit": "m^3/s", "parameters": ["T"] })).unwrap();
        assert_eq!(data.type_name(), "Expression");

        let data = decode(json!({ "labels": ["E", "s"], "units": ["eV", "m^2"], "values": [[0, 0], [1, 2]] })).unwrap();
        assert_eq!(data.as_lut().map(Lut::len), Some(2));
    }

    #[test]
    fn test_no_shape_matches() {
        let errors = decode(json!({ "a": 1.0, "b": 2.0 })).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.as_slice()[0].kind, ErrorKind::AmbiguousOrInvalidData);
        assert!(errors.as_slice()[0].path.is_root());
    }

    #[test]
    fn test_tagged_shape_reports_fields() {
        let errors = decode(json!({
            "type": "LUT",
            "labels": ["E"],
            "units": ["eV", "m^2"],
            "values": [[0, 1], [1, 2, 3]]
        }))
        .unwrap_err();
        let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["labels", "values[1]"]);

        let errors = decode(json!({ "type": "Spline" })).unwrap_err();
        assert_eq!(errors.as_slice()[0].kind, ErrorKind::UnknownVariant);
    }

    #[test]
    fn test_serializes_with_tag() {
        let data = DataVariant::ExtendedArrhenius(ExtendedArrhenius { a: 1.0, b: 0.0, c: 0.0 });
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json, json!({ "type": "ExtendedArrhenius", "a": 1.0, "b": 0.0, "c": 0.0 }));
        assert_eq!(decode(json).unwrap(), data);
    }

    #[test]
    fn test_arrhenius_evaluation() {
        let unit = ExtendedArrhenius { a: 1.0, b: 0.0, c: 0.0 };
        assert_eq!(unit.evaluate(&[300.0]).unwrap(), vec![1.0]);
        assert_eq!(unit.evaluate_at(0.0).unwrap(), 1.0);

        let activated = ExtendedArrhenius { a: 2.0, b: 1.0, c: 2.5 };
        assert_eq!(
            activated.evaluate(&[300.0, 0.0]),
            Err(NumericDomainError::ZeroTemperature { c: 2.5 })
        );
        let expected = 2.0 * 100.0 * (2.5_f64 / 100.0).exp();
        assert!((activated.evaluate_at(100.0).unwrap() - expected).abs() < 1e-12);

        let singular = ExtendedArrhenius { a: 1.0, b: -1.0, c: 0.0 };
        assert!(matches!(singular.evaluate_at(0.0), Err(NumericDomainError::NonFinite { .. })));
    }

    #[test]
    fn test_lut_interpolation() {
        let lut = table(vec![[0.0, 0.0], [1.0, 10.0], [3.0, 30.0]]);
        assert_eq!(lut.interpolate(0.0).unwrap(), 0.0);
        assert_eq!(lut.interpolate(0.5).unwrap(), 5.0);
        assert_eq!(lut.interpolate(2.0).unwrap(), 20.0);
        assert_eq!(lut.interpolate(3.0).unwrap(), 30.0);
        assert!(matches!(lut.interpolate(3.5), Err(NumericDomainError::OutOfRange { .. })));

        let flat = table(vec![[0.0, 0.0], [1.0, 1.0], [1.0, 2.0]]);
        assert_eq!(flat.interpolate(0.5), Err(NumericDomainError::NotIncreasing { row: 2 }));
        assert_eq!(table(Vec::new()).interpolate(0.0), Err(NumericDomainError::EmptyTable));
    }
}
