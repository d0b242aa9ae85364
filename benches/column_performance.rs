//! Performance benchmarks for the column model
//!
//! # What We're Measuring
//!
//! 1. **Right-hand side**: one evaluation of the column derivative, the
//!    inner loop of every solver.
//! 2. **Jacobian cost**: an implicit run with and without the sparsity hint.
//!    Without it every state entry is perturbed on its own.
//! 3. **Solver comparison**: RK4 against SDIRK over the load window.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all column benchmarks
//! cargo bench --bench column_performance
//!
//! # Run only the right-hand side
//! cargo bench --bench column_performance rhs
//! ```

use std::hint::black_box;
use std::time::Duration;

use chromosim::models::{ColumnConfig, ColumnModel};
use chromosim::physics::PhysicalModel;
use chromosim::solver::{RK4Solver, Scenario, SdirkSolver, Solver, SolverConfiguration};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::DVector;

fn multi_species_model(n_cells: usize) -> ColumnModel {
    let mut config = ColumnConfig::ev_aex_multi();
    config.n_cells = n_cells;
    ColumnModel::new(config).unwrap()
}

// =================================================================================================
// Benchmark Functions
// =================================================================================================

/// One right-hand side evaluation for growing grids
///
/// Cost should scale linearly with N: both operators are banded.
fn benchmark_rhs(c: &mut Criterion) {
    let mut group = c.benchmark_group("Column rhs");

    for n_cells in [20, 80, 320] {
        let model = multi_species_model(n_cells);
        let y = DVector::from_fn(model.state_len(), |i, _| 1e-3 * (i % 7) as f64);

        group.bench_with_input(BenchmarkId::from_parameter(n_cells), &n_cells, |b, _| {
            b.iter(|| model.rhs(black_box(450.0), black_box(&y)).unwrap());
        });
    }

    group.finish();
}

/// SDIRK over the load window with and without the sparsity hint
fn benchmark_sparsity_hint(c: &mut Criterion) {
    let mut group = c.benchmark_group("SDIRK jacobian");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let config = SolverConfiguration::adaptive(0.0, 600.0, 1e-6, 1e-6, 8.0);
    let solver = SdirkSolver::new();

    let colored = Scenario::new(Box::new(multi_species_model(40)));
    group.bench_function("colored", |b| {
        b.iter(|| solver.solve(black_box(&colored), black_box(&config)).unwrap());
    });

    let dense = Scenario::new(Box::new(multi_species_model(40))).without_sparsity();
    group.bench_function("dense", |b| {
        b.iter(|| solver.solve(black_box(&dense), black_box(&config)).unwrap());
    });

    group.finish();
}

/// Explicit vs implicit on the same window
fn benchmark_solver_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("Solver comparison");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let scenario = Scenario::new(Box::new(multi_species_model(80)));

    let fixed = SolverConfiguration::fixed_step(0.0, 600.0, 1200);
    group.bench_function("Runge-Kutta 4", |b| {
        b.iter(|| RK4Solver::new().solve(black_box(&scenario), black_box(&fixed)).unwrap());
    });

    let adaptive = SolverConfiguration::adaptive(0.0, 600.0, 1e-6, 1e-6, 8.0);
    group.bench_function("SDIRK2(1)", |b| {
        b.iter(|| SdirkSolver::new().solve(black_box(&scenario), black_box(&adaptive)).unwrap());
    });

    group.finish();
}

// =================================================================================================
// Criterion Configuration
// =================================================================================================

criterion_group!(
    benches,
    benchmark_rhs,
    benchmark_sparsity_hint,
    benchmark_solver_comparison
);
criterion_main!(benches);
