//! Shared test utilities: a fake native module built from Rust `extern "C"`
//! functions, with per-thread call counting and argument recording.

#![allow(dead_code)]

use feast_runtime::ffi::{EntryPoint, NativeModule};
use feast_runtime::{FeastError, FeastResult, FeatureTable, LabelColumn};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::os::raw::{c_double, c_int, c_uint};

pub use pretty_assertions::{assert_eq, assert_ne};

thread_local! {
    static CALLS: Cell<usize> = const { Cell::new(0) };
    static LAST: RefCell<Option<Recorded>> = const { RefCell::new(None) };
}

/// Arguments seen by the most recent fake call on this thread
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub symbol: &'static str,
    pub k: usize,
    pub n_samples: usize,
    pub n_features: usize,
    pub weights: Option<Vec<f64>>,
    pub beta_gamma: Option<(f64, f64)>,
}

/// Native calls made on this thread so far
pub fn calls() -> usize {
    CALLS.with(Cell::get)
}

pub fn last_call() -> Option<Recorded> {
    LAST.with(|last| last.borrow().clone())
}

fn record(symbol: &'static str, k: c_uint, n_samples: c_uint, n_features: c_uint) {
    CALLS.with(|c| c.set(c.get() + 1));
    LAST.with(|last| {
        *last.borrow_mut() = Some(Recorded {
            symbol,
            k: k as usize,
            n_samples: n_samples as usize,
            n_features: n_features as usize,
            weights: None,
            beta_gamma: None,
        })
    });
}

fn amend(update: impl FnOnce(&mut Recorded)) {
    LAST.with(|last| {
        if let Some(recorded) = last.borrow_mut().as_mut() {
            update(recorded);
        }
    });
}

/// Module resolving symbols from a fixed table
#[derive(Default)]
pub struct FakeModule {
    symbols: HashMap<&'static str, *const ()>,
}

impl FakeModule {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &'static str, function: *const ()) -> Self {
        self.symbols.insert(symbol, function);
        self
    }

    /// Every well-behaved fake routine
    pub fn standard() -> Self {
        Self::empty()
            .with("MIM", mim_codes as *const ())
            .with("CMIM", mim_codes as *const ())
            .with("JMI", mim_codes as *const ())
            .with("discMIM", mim_real as *const ())
            .with("discCMIM", mim_real as *const ())
            .with("weightedMIM", weighted_mim_codes as *const ())
            .with("BetaGamma", beta_gamma_codes as *const ())
            .with("discBetaGamma", beta_gamma_real as *const ())
            .with("CondMI", cond_mi_codes as *const ())
            .with("discCondMI", cond_mi_real as *const ())
            .with("weightedCondMI", weighted_cond_mi_codes as *const ())
    }
}

impl NativeModule for FakeModule {
    fn name(&self) -> &str {
        "fake"
    }

    fn entry_point(&self, symbol: &str) -> FeastResult<EntryPoint<'_>> {
        self.symbols
            .get(symbol)
            .map(|&ptr| unsafe { EntryPoint::from_raw(ptr) })
            .ok_or_else(|| FeastError::SymbolNotFound {
                module: self.name().to_string(),
                symbol: symbol.to_string(),
            })
    }
}

// ============================================================================
// Ranking
// ============================================================================

unsafe fn read_columns<T: Copy + Into<f64>>(
    columns: *mut *mut T,
    n_samples: c_uint,
    n_features: c_uint,
) -> Vec<Vec<f64>> {
    (0..n_features as usize)
        .map(|j| {
            let column = *columns.add(j);
            (0..n_samples as usize)
                .map(|i| (*column.add(i)).into())
                .collect()
        })
        .collect()
}

unsafe fn read_slice<T: Copy + Into<f64>>(values: *mut T, len: c_uint) -> Vec<f64> {
    (0..len as usize).map(|i| (*values.add(i)).into()).collect()
}

/// Plug-in mutual information of two discrete sequences, in nats
pub fn mutual_information(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mut joint: HashMap<(u64, u64), f64> = HashMap::new();
    let mut px: HashMap<u64, f64> = HashMap::new();
    let mut py: HashMap<u64, f64> = HashMap::new();
    for (a, b) in x.iter().zip(y) {
        *joint.entry((a.to_bits(), b.to_bits())).or_default() += 1.0;
        *px.entry(a.to_bits()).or_default() += 1.0;
        *py.entry(b.to_bits()).or_default() += 1.0;
    }
    joint
        .iter()
        .map(|((a, b), &count)| {
            let p = count / n;
            p * (p / ((px[a] / n) * (py[b] / n))).ln()
        })
        .sum()
}

/// Top `k` columns by mutual information with the labels, ties by index
fn rank(columns: &[Vec<f64>], labels: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut scored: Vec<(usize, f64)> = columns
        .iter()
        .enumerate()
        .map(|(j, column)| (j, mutual_information(column, labels)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}

unsafe fn write_ranking<T>(
    ranking: &[(usize, f64)],
    out: *mut T,
    scores: *mut c_double,
    to_index: impl Fn(usize) -> T,
) {
    for (slot, &(index, score)) in ranking.iter().enumerate() {
        *out.add(slot) = to_index(index);
        *scores.add(slot) = score;
    }
}

// ============================================================================
// Fake routines
// ============================================================================

pub unsafe extern "C" fn mim_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_uint,
    labels: *mut c_uint,
    out: *mut c_uint,
    scores: *mut c_double,
) -> *mut c_uint {
    record("MIM", k, n_samples, n_features);
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        k as usize,
    );
    write_ranking(&ranking, out, scores, |i| i as c_uint);
    out
}

pub unsafe extern "C" fn mim_real(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_double,
    labels: *mut c_double,
    out: *mut c_double,
    scores: *mut c_double,
) -> *mut c_double {
    record("discMIM", k, n_samples, n_features);
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        k as usize,
    );
    write_ranking(&ranking, out, scores, |i| i as c_double);
    out
}

pub unsafe extern "C" fn weighted_mim_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_uint,
    labels: *mut c_uint,
    weights: *mut c_double,
    out: *mut c_uint,
    scores: *mut c_double,
) -> *mut c_uint {
    record("weightedMIM", k, n_samples, n_features);
    let seen = read_slice(weights, n_samples);
    amend(|r| r.weights = Some(seen));
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        k as usize,
    );
    write_ranking(&ranking, out, scores, |i| i as c_uint);
    out
}

pub unsafe extern "C" fn beta_gamma_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_uint,
    labels: *mut c_uint,
    out: *mut c_uint,
    scores: *mut c_double,
    beta: c_double,
    gamma: c_double,
) -> *mut c_uint {
    record("BetaGamma", k, n_samples, n_features);
    amend(|r| r.beta_gamma = Some((beta, gamma)));
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        k as usize,
    );
    write_ranking(&ranking, out, scores, |i| i as c_uint);
    out
}

pub unsafe extern "C" fn beta_gamma_real(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_double,
    labels: *mut c_double,
    out: *mut c_double,
    scores: *mut c_double,
    beta: c_double,
    gamma: c_double,
) -> *mut c_double {
    record("discBetaGamma", k, n_samples, n_features);
    amend(|r| r.beta_gamma = Some((beta, gamma)));
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        k as usize,
    );
    write_ranking(&ranking, out, scores, |i| i as c_double);
    out
}

/// Picks the single best feature, then gives up on the remaining slots
pub unsafe extern "C" fn cond_mi_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_uint,
    labels: *mut c_uint,
    out: *mut c_uint,
    scores: *mut c_double,
) -> *mut c_uint {
    record("CondMI", k, n_samples, n_features);
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        1,
    );
    write_ranking(&ranking, out, scores, |i| i as c_uint);
    for slot in 1..k as usize {
        *out.add(slot) = u32::MAX;
    }
    out
}

pub unsafe extern "C" fn cond_mi_real(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    columns: *mut *mut c_double,
    labels: *mut c_double,
    out: *mut c_double,
    scores: *mut c_double,
) -> *mut c_double {
    record("discCondMI", k, n_samples, n_features);
    let ranking = rank(
        &read_columns(columns, n_samples, n_features),
        &read_slice(labels, n_samples),
        1,
    );
    write_ranking(&ranking, out, scores, |i| i as c_double);
    for slot in 1..k as usize {
        *out.add(slot) = -1.0;
    }
    out
}

/// Writes its sentinel through a signed view, as the weighted routine does
pub unsafe extern "C" fn weighted_cond_mi_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    _columns: *mut *mut c_uint,
    _labels: *mut c_uint,
    _weights: *mut c_double,
    out: *mut c_uint,
    _scores: *mut c_double,
) -> *mut c_uint {
    record("weightedCondMI", k, n_samples, n_features);
    let signed = out as *mut c_int;
    *signed = 0;
    for slot in 1..k as usize {
        *signed.add(slot) = -1;
    }
    out
}

pub unsafe extern "C" fn null_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    _columns: *mut *mut c_uint,
    _labels: *mut c_uint,
    _out: *mut c_uint,
    _scores: *mut c_double,
) -> *mut c_uint {
    record("null", k, n_samples, n_features);
    std::ptr::null_mut()
}

pub unsafe extern "C" fn out_of_range_codes(
    k: c_uint,
    n_samples: c_uint,
    n_features: c_uint,
    _columns: *mut *mut c_uint,
    _labels: *mut c_uint,
    out: *mut c_uint,
    _scores: *mut c_double,
) -> *mut c_uint {
    record("out_of_range", k, n_samples, n_features);
    for slot in 0..k as usize {
        *out.add(slot) = n_features;
    }
    out
}

// ============================================================================
// Data
// ============================================================================

/// `n_samples x n_features` codes in {0, 1, 2} with binary labels
///
/// Column 0 determines the label exactly; the other columns are
/// pseudo-random and carry little information.
pub fn three_level_codes(n_samples: usize, n_features: usize) -> (FeatureTable, LabelColumn) {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) % 3) as u32
    };

    let labels: Vec<u32> = (0..n_samples).map(|i| (i % 2) as u32).collect();
    let rows: Vec<Vec<u32>> = labels
        .iter()
        .map(|&label| {
            let mut row = vec![label * 2];
            row.extend((1..n_features).map(|_| next()));
            row
        })
        .collect();

    let table = FeatureTable::from_rows(&rows).expect("generated rows are rectangular");
    (table, LabelColumn::from(labels))
}
