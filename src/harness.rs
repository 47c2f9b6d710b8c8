//! Conversion test harness.
//!
//! Runs named cases through every applicable copy [`Strategy`] and records one [`Verdict`]
//! per (case, strategy). A raised [`ConversionError`] is reported as [`Verdict::Failed`],
//! never folded into [`Verdict::Mismatch`].

use std::fmt;

use compact_str::{CompactString, format_compact};
use ndarray::Axis;

use crate::{
    array::{HostArray, HostElement},
    error::ConversionError,
    matrix::{ConversionMode, NativeMatrix, from_native_matrix, to_native_matrix},
    vector::{ElementKind, HostValue, NativeVector, from_native_vector, to_native_vector},
};

#[derive(Debug, Clone, PartialEq)]
pub enum CaseInput {
    Matrix(HostArray),
    Vector { value: HostValue, kind: ElementKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub name: CompactString,
    pub input: CaseInput,
}

impl Case {
    pub fn matrix(name: impl Into<CompactString>, host: HostArray) -> Self {
        Self {
            name: name.into(),
            input: CaseInput::Matrix(host),
        }
    }

    pub fn vector(name: impl Into<CompactString>, value: HostValue, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            input: CaseInput::Vector { value, kind },
        }
    }

    pub fn strategies(&self) -> Vec<Strategy> {
        match self.input {
            CaseInput::Matrix(_) => MatrixStrategy::ALL.map(Strategy::Matrix).to_vec(),
            CaseInput::Vector { .. } => VectorStrategy::ALL.map(Strategy::Vector).to_vec(),
        }
    }
}

/// How a matrix case is converted and copied before being compared with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixStrategy {
    /// host -> matrix (copy) -> host
    CopyRoundTrip,
    /// host -> matrix (alias) -> host
    AliasRoundTrip,
    /// host -> matrix (copy) -> `deep_clone` -> host
    CopyClone,
    /// host -> matrix (copy) -> `copy_to` -> host
    CopyInto,
    /// host -> matrix (alias) -> `deep_clone` -> host
    AliasClone,
    /// host -> matrix (alias) -> `copy_to` -> host
    AliasInto,
}

impl MatrixStrategy {
    pub const ALL: [MatrixStrategy; 6] = [
        Self::CopyRoundTrip,
        Self::AliasRoundTrip,
        Self::CopyClone,
        Self::CopyInto,
        Self::AliasClone,
        Self::AliasInto,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::CopyRoundTrip => "copy_round_trip",
            Self::AliasRoundTrip => "alias_round_trip",
            Self::CopyClone => "copy_clone",
            Self::CopyInto => "copy_into",
            Self::AliasClone => "alias_clone",
            Self::AliasInto => "alias_into",
        }
    }

    pub const fn mode(self) -> ConversionMode {
        match self {
            Self::CopyRoundTrip | Self::CopyClone | Self::CopyInto => ConversionMode::Copy,
            Self::AliasRoundTrip | Self::AliasClone | Self::AliasInto => ConversionMode::ViewAlias,
        }
    }
}

/// How a vector case is copied before being compared with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum VectorStrategy {
    #[serde(rename = "vector_clone")]
    DeepClone,
    #[serde(rename = "vector_copy_into")]
    CopyInto,
}

impl VectorStrategy {
    pub const ALL: [VectorStrategy; 2] = [Self::DeepClone, Self::CopyInto];

    pub const fn name(self) -> &'static str {
        match self {
            Self::DeepClone => "vector_clone",
            Self::CopyInto => "vector_copy_into",
        }
    }
}

/// Strategy recorded in a [`CaseResult`]. Serializes as the bare strategy name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(untagged)]
pub enum Strategy {
    Matrix(MatrixStrategy),
    Vector(VectorStrategy),
}

impl Strategy {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Matrix(strategy) => strategy.name(),
            Self::Vector(strategy) => strategy.name(),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "verdict", content = "error", rename_all = "snake_case")]
pub enum Verdict {
    Success,
    Mismatch,
    Failed(ConversionError),
}

impl Verdict {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Mismatch => write!(f, "fail"),
            Self::Failed(err) => write!(f, "error: {}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CaseResult {
    pub case: CompactString,
    pub strategy: Strategy,
    #[serde(flatten)]
    pub verdict: Verdict,
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.case, self.strategy, self.verdict)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Report {
    pub results: Vec<CaseResult>,
}

impl Report {
    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.verdict.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|r| !r.verdict.is_success())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{}", result)?;
        }
        Ok(())
    }
}

fn verdict(outcome: Result<bool, ConversionError>) -> Verdict {
    match outcome {
        Ok(true) => Verdict::Success,
        Ok(false) => Verdict::Mismatch,
        Err(err) => Verdict::Failed(err),
    }
}

fn check_matrix(host: &HostArray, strategy: MatrixStrategy) -> Result<bool, ConversionError> {
    let matrix = to_native_matrix(host, strategy.mode())?;

    let back = match strategy {
        MatrixStrategy::CopyRoundTrip | MatrixStrategy::AliasRoundTrip => {
            from_native_matrix(&matrix)?
        }
        MatrixStrategy::CopyClone | MatrixStrategy::AliasClone => {
            from_native_matrix(&matrix.deep_clone())?
        }
        MatrixStrategy::CopyInto | MatrixStrategy::AliasInto => {
            let mut dst = NativeMatrix::default();
            matrix.copy_to(&mut dst);
            from_native_matrix(&dst)?
        }
    };
    Ok(back == *host)
}

fn check_vector(
    value: &HostValue,
    kind: ElementKind,
    strategy: VectorStrategy,
) -> Result<bool, ConversionError> {
    let vector = to_native_vector(value, kind)?;

    let copy = match strategy {
        VectorStrategy::DeepClone => vector.deep_clone(),
        VectorStrategy::CopyInto => {
            let mut dst = NativeVector::default();
            vector.copy_to(&mut dst);
            dst
        }
    };
    Ok(from_native_vector(&copy) == *value)
}

fn record(case: &Case, strategy: Strategy, outcome: Result<bool, ConversionError>) -> CaseResult {
    let verdict = verdict(outcome);
    if verdict.is_success() {
        tracing::debug!(case = %case.name, %strategy, "conversion check succeeded");
    } else {
        tracing::warn!(case = %case.name, %strategy, %verdict, "conversion check did not succeed");
    }
    CaseResult {
        case: case.name.clone(),
        strategy,
        verdict,
    }
}

/// Run one case through every strategy that applies to it.
pub fn run_case(case: &Case) -> Vec<CaseResult> {
    match &case.input {
        CaseInput::Matrix(host) => MatrixStrategy::ALL
            .iter()
            .map(|&strategy| record(case, Strategy::Matrix(strategy), check_matrix(host, strategy)))
            .collect(),
        CaseInput::Vector { value, kind } => VectorStrategy::ALL
            .iter()
            .map(|&strategy| {
                record(case, Strategy::Vector(strategy), check_vector(value, *kind, strategy))
            })
            .collect(),
    }
}

pub fn run(cases: &[Case]) -> Report {
    Report {
        results: cases.iter().flat_map(run_case).collect(),
    }
}

const INT_A2: [[i32; 3]; 2] = [[1, -2, 3], [-4, 5, -6]];
const INT_A3: [[[i32; 3]; 3]; 2] = [
    [[-1, 2, 3], [4, 5, -6], [7, -8, 9]],
    [[11, 12, -13], [14, -15, 16], [-17, 18, 19]],
];
const FLOAT_A2: [[f64; 3]; 2] = [[1.6, -2.5, 3.4], [-4.3, 5.2, -6.1]];
const FLOAT_A3: [[[f64; 3]; 3]; 2] = [
    [[-1.2, 2.3, 3.4], [4.5, 5.6, -6.7], [7.8, -8.9, 9.8]],
    [[11.7, 12.6, -13.5], [14.4, -15.3, 16.2], [-17.1, 18.2, 19.3]],
];

fn host2<T: HostElement>(rows: [[T; 3]; 2]) -> HostArray {
    T::into_host(ndarray::arr2(&rows).into_dyn())
}

fn host3<T: HostElement>(blocks: [[[T; 3]; 3]; 2]) -> HostArray {
    T::into_host(ndarray::arr3(&blocks).into_dyn())
}

fn int_pair<T: HostElement>(convert: impl Fn(i32) -> T + Copy) -> [HostArray; 2] {
    [
        host2(INT_A2.map(|row| row.map(convert))),
        host3(INT_A3.map(|block| block.map(|row| row.map(convert)))),
    ]
}

fn float_pair<T: HostElement>(convert: impl Fn(f64) -> T + Copy) -> [HostArray; 2] {
    [
        host2(FLOAT_A2.map(|row| row.map(convert))),
        host3(FLOAT_A3.map(|block| block.map(|row| row.map(convert)))),
    ]
}

/// The built-in cases: rank-2 and rank-3 matrices for every supported element type, two
/// non-contiguous matrices, and boolean/integer/float vectors one to three levels deep.
pub fn standard_cases() -> Vec<Case> {
    let matrices = [
        ("8s", int_pair(|v| v as i8)),
        ("8u", int_pair(|v| v.unsigned_abs() as u8)),
        ("16s", int_pair(|v| v as i16)),
        ("16u", int_pair(|v| v.unsigned_abs() as u16)),
        ("32s", int_pair(|v| v)),
        ("32f", float_pair(|v| v as f32)),
        ("64f", float_pair(|v| v)),
    ];

    let mut cases = Vec::new();
    for (tag, [a2, a3]) in matrices {
        cases.push(Case::matrix(format_compact!("a2_{}", tag), a2));
        cases.push(Case::matrix(format_compact!("a3_{}", tag), a3));
    }

    let transposed = ndarray::arr2(&INT_A2).reversed_axes();
    cases.push(Case::matrix("a2_32s_transposed", HostArray::from(transposed.into_dyn())));

    let mut reversed = ndarray::arr3(&FLOAT_A3);
    reversed.invert_axis(Axis(1));
    cases.push(Case::matrix("a3_64f_reversed", HostArray::from(reversed.into_dyn())));

    let b1_b = vec![true, false, true];
    let b2_b = vec![vec![true, false, true], vec![false, false, true]];
    let b1_l = vec![1i64, 2, 3];
    let b2_l = vec![vec![1i64, 2, 3], vec![4, 5, 6]];
    let b1_f = vec![1.2f64, 2.3, 3.4];
    let b2_f = vec![vec![1.2f64, 2.3, 3.4], vec![4.5, 5.6, 6.7]];

    let vectors = [
        ("b1_b", HostValue::from(b1_b), ElementKind::Boolean),
        ("b1_l", HostValue::from(b1_l), ElementKind::Numeric),
        ("b1_f", HostValue::from(b1_f), ElementKind::Numeric),
        ("b2_b", HostValue::from(b2_b.clone()), ElementKind::Boolean),
        ("b2_l", HostValue::from(b2_l.clone()), ElementKind::Numeric),
        ("b2_f", HostValue::from(b2_f.clone()), ElementKind::Numeric),
        ("b3_b", HostValue::from(vec![b2_b.clone(), b2_b]), ElementKind::Boolean),
        ("b3_l", HostValue::from(vec![b2_l.clone(), b2_l]), ElementKind::Numeric),
        ("b3_f", HostValue::from(vec![b2_f.clone(), b2_f]), ElementKind::Numeric),
        (
            "b2_l_ragged",
            HostValue::from(vec![vec![1i64, -2, 3], vec![4], vec![]]),
            ElementKind::Numeric,
        ),
    ];
    for (name, value, kind) in vectors {
        cases.push(Case::vector(name, value, kind));
    }

    cases
}
