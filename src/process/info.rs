use serde::Serialize;
use serde_json::{Map, Value};

use super::data::DataVariant;
use super::reaction::Reaction;
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::{ErrorKind, FieldPath};

/// A quantity with its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitValue {
    /// Unit of `value`
    pub unit: String,
    /// The value
    pub value: f64,
}

impl FromPayload for UnitValue {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let unit = payload::required_string(map, "unit", path, ctx);
        let value = payload::required_number(map, "value", path, ctx);
        Some(UnitValue {
            unit: unit?,
            value: value?,
        })
    }
}

/// Ratios used when converting a cross section between frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSectionParameters {
    /// Electron to target mass ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass_ratio: Option<f64>,
    /// Ratio of upper to lower statistical weights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistical_weight_ratio: Option<f64>,
}

fn positive(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<f64> {
    let n = payload::number(value, path, ctx)?;
    if n <= 0.0 {
        ctx.structural(path, format!("must be greater than 0, found {}", n));
        return None;
    }
    Some(n)
}

impl FromPayload for CrossSectionParameters {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let mass_ratio = payload::optional_with(map, "massRatio", path, ctx, positive);
        let statistical_weight_ratio = payload::optional_with(map, "statisticalWeightRatio", path, ctx, positive);
        Some(CrossSectionParameters {
            mass_ratio: mass_ratio?,
            statistical_weight_ratio: statistical_weight_ratio?,
        })
    }
}

/// Cross section as a function of energy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSectionInfo<R> {
    /// Energy threshold of the process
    pub threshold: f64,
    /// Frame conversion ratios
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<CrossSectionParameters>,
    /// Citations of the data source
    pub references: Vec<R>,
    /// Free-text remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    /// The tabulated cross section
    pub data: DataVariant,
}

/// Rate coefficient or energy rate coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateCoefficientInfo<R> {
    /// Threshold with its unit
    pub threshold: UnitValue,
    /// Citations of the data source
    pub references: Vec<R>,
    /// Free-text remarks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    /// The rate coefficient data
    pub data: DataVariant,
}

/// Kind of data a [`ProcessInfo`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProcessInfoType {
    /// `CrossSection`
    CrossSection,
    /// `RateCoefficient`
    RateCoefficient,
    /// `EnergyRateCoefficient`
    EnergyRateCoefficient,
}

impl ProcessInfoType {
    /// Wire tag of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessInfoType::CrossSection => "CrossSection",
            ProcessInfoType::RateCoefficient => "RateCoefficient",
            ProcessInfoType::EnergyRateCoefficient => "EnergyRateCoefficient",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        [
            ProcessInfoType::CrossSection,
            ProcessInfoType::RateCoefficient,
            ProcessInfoType::EnergyRateCoefficient,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == tag)
    }
}

/// Measured data of a process, with references of type `R`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
#[allow(missing_docs)]
pub enum ProcessInfo<R> {
    CrossSection(CrossSectionInfo<R>),
    RateCoefficient(RateCoefficientInfo<R>),
    EnergyRateCoefficient(RateCoefficientInfo<R>),
}

impl<R> ProcessInfo<R> {
    /// The variant tag.
    pub fn info_type(&self) -> ProcessInfoType {
        match self {
            ProcessInfo::CrossSection(_) => ProcessInfoType::CrossSection,
            ProcessInfo::RateCoefficient(_) => ProcessInfoType::RateCoefficient,
            ProcessInfo::EnergyRateCoefficient(_) => ProcessInfoType::EnergyRateCoefficient,
        }
    }

    /// Citations of the data source.
    pub fn references(&self) -> &[R] {
        match self {
            ProcessInfo::CrossSection(info) => &info.references,
            ProcessInfo::RateCoefficient(info) | ProcessInfo::EnergyRateCoefficient(info) => &info.references,
        }
    }

    /// Free-text remarks.
    pub fn comments(&self) -> &[String] {
        let comments = match self {
            ProcessInfo::CrossSection(info) => &info.comments,
            ProcessInfo::RateCoefficient(info) | ProcessInfo::EnergyRateCoefficient(info) => &info.comments,
        };
        comments.as_deref().unwrap_or_default()
    }

    /// The data itself.
    pub fn data(&self) -> &DataVariant {
        match self {
            ProcessInfo::CrossSection(info) => &info.data,
            ProcessInfo::RateCoefficient(info) | ProcessInfo::EnergyRateCoefficient(info) => &info.data,
        }
    }
}

struct Common<R> {
    references: Vec<R>,
    comments: Option<Vec<String>>,
    data: DataVariant,
}

fn decode_common<R: FromPayload>(
    map: &Map<String, Value>,
    path: &FieldPath,
    ctx: &mut Context<'_>,
) -> Option<Common<R>> {
    let references_path = path.field("references");
    let references = payload::required(map, "references", path, ctx)
        .and_then(|v| payload::array(v, &references_path, ctx))
        .and_then(|items| payload::each(items, &references_path, ctx, R::from_payload));
    let comments = payload::optional_with(map, "comments", path, ctx, payload::string_list);
    let data = payload::required(map, "data", path, ctx).and_then(|v| DataVariant::from_payload(v, &path.field("data"), ctx));
    Some(Common {
        references: references?,
        comments: comments?,
        data: data?,
    })
}

impl<R: FromPayload> FromPayload for ProcessInfo<R> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let tag = payload::required_string(map, "type", path, ctx)?;
        let Some(info_type) = ProcessInfoType::from_tag(&tag) else {
            ctx.push(
                &path.field("type"),
                ErrorKind::UnknownVariant,
                format!("unknown process info type \"{}\"", tag),
            );
            return None;
        };

        match info_type {
            ProcessInfoType::CrossSection => {
                let threshold = payload::required_number(map, "threshold", path, ctx);
                let parameters =
                    payload::optional_with(map, "parameters", path, ctx, CrossSectionParameters::from_payload);
                let common = decode_common::<R>(map, path, ctx);
                let (threshold, parameters, common) = (threshold?, parameters?, common?);
                if common.data.as_lut().is_none() {
                    ctx.structural(
                        &path.field("data"),
                        format!("cross sections are tabulated as LUT, found {}", common.data.type_name()),
                    );
                    return None;
                }
                Some(ProcessInfo::CrossSection(CrossSectionInfo {
                    threshold,
                    parameters,
                    references: common.references,
                    comments: common.comments,
                    data: common.data,
                }))
            }
            ProcessInfoType::RateCoefficient | ProcessInfoType::EnergyRateCoefficient => {
                let threshold = payload::required(map, "threshold", path, ctx)
                    .and_then(|v| UnitValue::from_payload(v, &path.field("threshold"), ctx));
                let common = decode_common::<R>(map, path, ctx);
                let (threshold, common) = (threshold?, common?);
                let info = RateCoefficientInfo {
                    threshold,
                    references: common.references,
                    comments: common.comments,
                    data: common.data,
                };
                Some(match info_type {
                    ProcessInfoType::EnergyRateCoefficient => ProcessInfo::EnergyRateCoefficient(info),
                    _ => ProcessInfo::RateCoefficient(info),
                })
            }
        }
    }
}

/// A reaction together with one or more data records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Process<S, I> {
    /// The reaction
    pub reaction: Reaction<S>,
    /// Data records, at least one
    pub info: Vec<I>,
}

impl<S: FromPayload, I: FromPayload> FromPayload for Process<S, I> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let reaction = payload::required(map, "reaction", path, ctx)
            .and_then(|v| Reaction::<S>::from_payload(v, &path.field("reaction"), ctx));
        let info_path = path.field("info");
        let info = payload::required(map, "info", path, ctx)
            .and_then(|v| payload::array(v, &info_path, ctx))
            .and_then(|items| {
                if items.is_empty() {
                    ctx.structural(&info_path, "process needs at least one info entry");
                    return None;
                }
                payload::each(items, &info_path, ctx, I::from_payload)
            });
        Some(Process {
            reaction: reaction?,
            info: info?,
        })
    }
}
