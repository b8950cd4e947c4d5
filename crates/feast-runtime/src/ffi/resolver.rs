//! Routine resolution - (algorithm, facets) → native entry point
//!
//! The native library exports one symbol per algorithm and calling
//! convention. Resolution is a lookup in a closed, immutable table; a
//! combination missing from the table is an error rather than a guess.
//!
//! | facets (discretized, weighted, extended) | symbols | element |
//! |---|---|---|
//! | (false, false, false) | `CMIM` .. `mRMR_D` | `c_uint` |
//! | (true, false, false) | `discCMIM` .. `disc_mRMR_D` | `c_double` |
//! | (false, true, false) | `weightedCMIM` .. `weightedMIM` | `c_uint` |
//! | (true, true, false) | `discWeightedCMIM` .. `discWeightedMIM` | `c_double` |
//! | (false, false, true) | `BetaGamma` | `c_uint` |
//! | (true, false, true) | `discBetaGamma` | `c_double` |
//!
//! The element type governs the feature matrix, the labels and the returned
//! index buffer alike. Scores are `double` everywhere.

use crate::error::{FeastError, FeastResult};
use crate::ffi::types::ElementType;
use std::fmt;
use std::str::FromStr;

/// Selection criteria exported by the native library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Conditional Mutual Information Maximisation (Fleuret 2004)
    Cmim,
    /// Greedy conditional mutual information
    CondMi,
    /// Double Input Symmetrical Relevance (Meyer & Bontempi 2006)
    Disr,
    /// Interaction Capping (Jakulin 2005)
    Icap,
    /// Joint Mutual Information (Yang & Moody 1999)
    Jmi,
    /// Mutual Information Maximisation
    Mim,
    /// Minimum Redundancy Maximum Relevance, difference variant (Peng 2005)
    Mrmr,
    /// Beta-Gamma space (Brown 2009), takes two extra scalars
    BetaGamma,
}

impl Algorithm {
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Cmim,
        Algorithm::CondMi,
        Algorithm::Disr,
        Algorithm::Icap,
        Algorithm::Jmi,
        Algorithm::Mim,
        Algorithm::Mrmr,
        Algorithm::BetaGamma,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Cmim => "CMIM",
            Algorithm::CondMi => "CondMI",
            Algorithm::Disr => "DISR",
            Algorithm::Icap => "ICAP",
            Algorithm::Jmi => "JMI",
            Algorithm::Mim => "MIM",
            Algorithm::Mrmr => "mRMR",
            Algorithm::BetaGamma => "BetaGamma",
        }
    }

    /// Whether the routine may leave slots unfilled
    ///
    /// Only CondMI stops early, marking the remaining slots with a sentinel.
    pub fn has_unselected_sentinel(&self) -> bool {
        matches!(self, Algorithm::CondMi)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cmim" => Ok(Algorithm::Cmim),
            "condmi" | "cmi" => Ok(Algorithm::CondMi),
            "disr" => Ok(Algorithm::Disr),
            "icap" => Ok(Algorithm::Icap),
            "jmi" => Ok(Algorithm::Jmi),
            "mim" => Ok(Algorithm::Mim),
            "mrmr" | "mrmr_d" => Ok(Algorithm::Mrmr),
            "betagamma" => Ok(Algorithm::BetaGamma),
            _ => Err(format!("unknown algorithm '{}'", s)),
        }
    }
}

/// Calling-convention facets of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Facets {
    /// Real-valued inputs binned by the native routine (`disc*` symbols)
    pub discretized: bool,
    /// Per-sample weight column follows the labels
    pub weighted: bool,
    /// `beta` and `gamma` scalars trail the argument list
    pub extended: bool,
}

impl Facets {
    pub const fn new(discretized: bool, weighted: bool, extended: bool) -> Self {
        Self {
            discretized,
            weighted,
            extended,
        }
    }
}

impl fmt::Display for Facets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discretized={}, weighted={}, extended={}",
            self.discretized, self.weighted, self.extended
        )
    }
}

/// Positional argument layout of an entry point
///
/// - `Plain`: `(k, n_samples, n_features, columns, labels, out_indices, out_scores)`
/// - `Weighted`: `Plain` with `weights` inserted after `labels`
/// - `Extended`: `Plain` followed by `beta, gamma`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgShape {
    Plain,
    Weighted,
    Extended,
}

impl ArgShape {
    pub fn arity(&self) -> usize {
        match self {
            ArgShape::Plain => 7,
            ArgShape::Weighted => 8,
            ArgShape::Extended => 9,
        }
    }
}

/// A resolved native entry point and its contract
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RoutineDescriptor {
    pub algorithm: Algorithm,
    pub facets: Facets,
    /// Exported symbol name
    pub symbol: &'static str,
    pub shape: ArgShape,
    /// Element type of the matrix, the labels and the returned index buffer
    pub element: ElementType,
}

impl RoutineDescriptor {
    const fn new(algorithm: Algorithm, discretized: bool, weighted: bool, symbol: &'static str) -> Self {
        let extended = matches!(algorithm, Algorithm::BetaGamma);
        let shape = if weighted {
            ArgShape::Weighted
        } else if extended {
            ArgShape::Extended
        } else {
            ArgShape::Plain
        };
        let element = if discretized {
            ElementType::Real
        } else {
            ElementType::IntegerCode
        };
        Self {
            algorithm,
            facets: Facets::new(discretized, weighted, extended),
            symbol,
            shape,
            element,
        }
    }

    /// Element type of the returned index buffer
    pub fn returns(&self) -> ElementType {
        self.element
    }

    /// C-style signature, e.g. `(c_uint,c_uint,c_uint,c_uint**,c_uint*,c_uint*,c_double*)->c_uint*`
    pub fn signature(&self) -> String {
        let elem = self.element.display_name();
        let mut params = vec![
            "c_uint".to_string(),
            "c_uint".to_string(),
            "c_uint".to_string(),
            format!("{}**", elem),
            format!("{}*", elem),
        ];
        if self.shape == ArgShape::Weighted {
            params.push("c_double*".to_string());
        }
        params.push(format!("{}*", elem));
        params.push("c_double*".to_string());
        if self.shape == ArgShape::Extended {
            params.push("c_double".to_string());
            params.push("c_double".to_string());
        }
        format!("({})->{}*", params.join(","), elem)
    }
}

use Algorithm::*;

static ROUTINES: [RoutineDescriptor; 26] = [
    RoutineDescriptor::new(Cmim, false, false, "CMIM"),
    RoutineDescriptor::new(CondMi, false, false, "CondMI"),
    RoutineDescriptor::new(Disr, false, false, "DISR"),
    RoutineDescriptor::new(Icap, false, false, "ICAP"),
    RoutineDescriptor::new(Jmi, false, false, "JMI"),
    RoutineDescriptor::new(Mim, false, false, "MIM"),
    RoutineDescriptor::new(Mrmr, false, false, "mRMR_D"),
    RoutineDescriptor::new(Cmim, true, false, "discCMIM"),
    RoutineDescriptor::new(CondMi, true, false, "discCondMI"),
    RoutineDescriptor::new(Disr, true, false, "discDISR"),
    RoutineDescriptor::new(Icap, true, false, "discICAP"),
    RoutineDescriptor::new(Jmi, true, false, "discJMI"),
    RoutineDescriptor::new(Mim, true, false, "discMIM"),
    RoutineDescriptor::new(Mrmr, true, false, "disc_mRMR_D"),
    RoutineDescriptor::new(Cmim, false, true, "weightedCMIM"),
    RoutineDescriptor::new(CondMi, false, true, "weightedCondMI"),
    RoutineDescriptor::new(Disr, false, true, "weightedDISR"),
    RoutineDescriptor::new(Jmi, false, true, "weightedJMI"),
    RoutineDescriptor::new(Mim, false, true, "weightedMIM"),
    RoutineDescriptor::new(Cmim, true, true, "discWeightedCMIM"),
    RoutineDescriptor::new(CondMi, true, true, "discWeightedCondMI"),
    RoutineDescriptor::new(Disr, true, true, "discWeightedDISR"),
    RoutineDescriptor::new(Jmi, true, true, "discWeightedJMI"),
    RoutineDescriptor::new(Mim, true, true, "discWeightedMIM"),
    RoutineDescriptor::new(BetaGamma, false, false, "BetaGamma"),
    RoutineDescriptor::new(BetaGamma, true, false, "discBetaGamma"),
];

/// Every entry point the adapter knows about
pub fn routines() -> &'static [RoutineDescriptor] {
    &ROUTINES
}

/// Resolve an algorithm and facet combination to its entry point
pub fn resolve(algorithm: Algorithm, facets: Facets) -> FeastResult<&'static RoutineDescriptor> {
    ROUTINES
        .iter()
        .find(|r| r.algorithm == algorithm && r.facets == facets)
        .ok_or(FeastError::UnsupportedCombination { algorithm, facets })
}
