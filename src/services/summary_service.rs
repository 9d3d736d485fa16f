use std::collections::{BTreeMap, HashSet};

use crate::models::{AnnualSummary, Observation, ShannonIndex};

#[derive(Default)]
struct YearAccumulator<'a> {
    n_observations: usize,
    total_abundance: f64,
    species: HashSet<&'a str>,
    transects: HashSet<&'a str>,
    observers: HashSet<&'a str>,
}

/// Per-year rollup of a cleaned observation set, in year order.
///
/// Only years that hold observations appear; there is no zero-filling.
pub fn annual_summary(observations: &[Observation]) -> Vec<AnnualSummary> {
    let mut by_year: BTreeMap<i32, YearAccumulator> = BTreeMap::new();

    for obs in observations {
        let acc = by_year.entry(obs.year).or_default();
        acc.n_observations += 1;
        acc.total_abundance += obs.individual_count;
        acc.species.insert(&obs.species_name);
        acc.transects.insert(&obs.transect_name);
        if let Some(observer) = obs.observer_name.as_deref() {
            acc.observers.insert(observer);
        }
    }

    by_year
        .into_iter()
        .map(|(year, acc)| AnnualSummary {
            year,
            n_observations: acc.n_observations,
            n_species: acc.species.len(),
            total_abundance: acc.total_abundance,
            n_transects: acc.transects.len(),
            n_observers: acc.observers.len(),
        })
        .collect()
}

/// Individuals per species for one year, keyed by species name
pub fn species_counts(observations: &[Observation], year: i32) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, f64> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.year == year) {
        *counts.entry(obs.species_name.clone()).or_default() += obs.individual_count;
    }
    counts
}

/// Shannon diversity index of one year's observations
pub fn shannon_index(observations: &[Observation], year: i32) -> ShannonIndex {
    shannon_index_from_counts(species_counts(observations, year).into_values())
}

/// Shannon index `H = -Σ p_i ln(p_i)` of a species-count vector
///
/// Species with no individuals are left out before taking logarithms. A vector
/// with no individuals at all has no defined diversity.
///
/// # Examples
///
/// ```
/// use birds_biodiversity::services::summary_service::shannon_index_from_counts;
///
/// let h = shannon_index_from_counts([1.0, 1.0]).value().unwrap();
/// assert!((h - 2f64.ln()).abs() < 1e-12);
/// assert!(shannon_index_from_counts([]).is_undefined());
/// ```
pub fn shannon_index_from_counts<I>(counts: I) -> ShannonIndex
where
    I: IntoIterator<Item = f64>,
{
    let counts: Vec<f64> = counts.into_iter().collect();
    let total: f64 = counts.iter().sum();

    if !(total > 0.0) {
        return ShannonIndex::Undefined;
    }

    let entropy: f64 = counts
        .iter()
        .map(|count| count / total)
        .filter(|p| *p > 0.0)
        .map(|p| p * p.ln())
        .sum();

    // subtract rather than negate so a single species gives 0.0, not -0.0
    ShannonIndex::Value(0.0 - entropy)
}

/// Shannon index for every year present, in year order
pub fn diversity_by_year(observations: &[Observation]) -> Vec<(i32, ShannonIndex)> {
    let years: HashSet<i32> = observations.iter().map(|o| o.year).collect();
    let mut years: Vec<i32> = years.into_iter().collect();
    years.sort_unstable();

    years
        .into_iter()
        .map(|year| (year, shannon_index(observations, year)))
        .collect()
}
