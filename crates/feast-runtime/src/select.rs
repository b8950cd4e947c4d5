//! Caller-facing selection API
//!
//! Facets are inferred from the inputs unless set explicitly:
//! - a `Real` table selects the `disc*` routines
//! - a weight column selects the weighted routines
//! - `beta` and `gamma` select the extended routine; giving only one of the
//!   pair is an error

use crate::error::{FeastError, FeastResult};
use crate::ffi::caller::Invocation;
use crate::ffi::loader::{self, FeastLibrary, NativeModule};
use crate::ffi::marshal::ResultDecoder;
use crate::ffi::resolver::{resolve, Algorithm, Facets};
use crate::ffi::types::{ElementType, ExtraParameters};
use crate::result::SelectionResult;
use crate::table::{FeatureTable, LabelColumn, WeightColumn};
use feast_config::Config;
use tracing::debug;

/// One selection run, before resolution
#[derive(Debug, Clone)]
pub struct SelectionRequest<'a> {
    algorithm: Algorithm,
    table: &'a FeatureTable,
    labels: &'a LabelColumn,
    k: usize,
    weights: Option<&'a WeightColumn>,
    extra: Option<ExtraParameters>,
    /// Name of the scalar left out of an incomplete `beta_gamma` call
    missing_scalar: Option<&'static str>,
    discretized: Option<bool>,
}

impl<'a> SelectionRequest<'a> {
    pub fn new(
        algorithm: Algorithm,
        table: &'a FeatureTable,
        labels: &'a LabelColumn,
        k: usize,
    ) -> Self {
        Self {
            algorithm,
            table,
            labels,
            k,
            weights: None,
            extra: None,
            missing_scalar: None,
            discretized: None,
        }
    }

    pub fn weights(mut self, weights: &'a WeightColumn) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn extra(mut self, extra: ExtraParameters) -> Self {
        self.extra = Some(extra);
        self.missing_scalar = None;
        self
    }

    /// Set the Beta-Gamma scalars; nothing happens if both are `None`
    ///
    /// Exactly one `Some` makes the request fail with
    /// `IncompleteExtraParameters` before any routine is resolved.
    pub fn beta_gamma(mut self, beta: Option<f64>, gamma: Option<f64>) -> Self {
        match (beta, gamma) {
            (Some(beta), Some(gamma)) => return self.extra(ExtraParameters::new(beta, gamma)),
            (Some(_), None) => self.missing_scalar = Some("gamma"),
            (None, Some(_)) => self.missing_scalar = Some("beta"),
            (None, None) => {}
        }
        self
    }

    /// Override the facet inferred from the table's element type
    pub fn discretized(mut self, discretized: bool) -> Self {
        self.discretized = Some(discretized);
        self
    }

    pub fn facets(&self) -> Facets {
        Facets::new(
            self.discretized
                .unwrap_or(self.table.element_type() == ElementType::Real),
            self.weights.is_some(),
            self.extra.is_some() || self.missing_scalar.is_some(),
        )
    }

    fn check_complete(&self) -> FeastResult<()> {
        match self.missing_scalar {
            Some(missing) => Err(FeastError::IncompleteExtraParameters { missing }),
            None => Ok(()),
        }
    }
}

/// Feature selection over a native module
pub struct Feast<M: NativeModule> {
    module: M,
    reject_constant_labels: bool,
}

impl<M: NativeModule> Feast<M> {
    pub fn new(module: M) -> Self {
        Self {
            module,
            reject_constant_labels: true,
        }
    }

    /// Take the selection settings from `config`
    pub fn with_config(module: M, config: &Config) -> Self {
        Self::new(module).reject_constant_labels(config.reject_constant_labels())
    }

    pub fn reject_constant_labels(mut self, reject: bool) -> Self {
        self.reject_constant_labels = reject;
        self
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Resolve, invoke and decode one request
    pub fn run(&self, request: &SelectionRequest<'_>) -> FeastResult<SelectionResult> {
        request.check_complete()?;
        let facets = request.facets();
        let descriptor = resolve(request.algorithm, facets)?;
        debug!(
            algorithm = %request.algorithm,
            %facets,
            symbol = descriptor.symbol,
            "resolved selection routine"
        );

        let mut invocation =
            Invocation::new(descriptor, request.table, request.labels, request.k)
                .reject_constant_labels(self.reject_constant_labels);
        if let Some(weights) = request.weights {
            invocation = invocation.with_weights(weights);
        }
        if let Some(extra) = request.extra {
            invocation = invocation.with_extra(extra);
        }

        let output = invocation.invoke(&self.module)?;
        ResultDecoder::new(descriptor, request.k, request.table.n_features()).decode(output)
    }

    /// Select `k` features of `table` with inferred facets
    #[allow(clippy::too_many_arguments)]
    pub fn select(
        &self,
        algorithm: Algorithm,
        table: &FeatureTable,
        labels: &LabelColumn,
        k: usize,
        weights: Option<&WeightColumn>,
        beta: Option<f64>,
        gamma: Option<f64>,
    ) -> FeastResult<SelectionResult> {
        let mut request = SelectionRequest::new(algorithm, table, labels, k).beta_gamma(beta, gamma);
        if let Some(weights) = weights {
            request = request.weights(weights);
        }
        self.run(&request)
    }
}

impl Feast<&'static FeastLibrary> {
    /// Selector over the process-wide native module
    pub fn shared() -> FeastResult<Self> {
        let shared = loader::shared()?;
        Ok(Self::with_config(shared.library, &shared.config))
    }
}

/// Select `k` features with the process-wide native module
pub fn select(
    algorithm: Algorithm,
    table: &FeatureTable,
    labels: &LabelColumn,
    k: usize,
    weights: Option<&WeightColumn>,
    beta: Option<f64>,
    gamma: Option<f64>,
) -> FeastResult<SelectionResult> {
    Feast::shared()?.select(algorithm, table, labels, k, weights, beta, gamma)
}
