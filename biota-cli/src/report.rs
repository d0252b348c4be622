//! Population reporting

use biota_runtime::{Engine, PopulationStats};
use std::collections::VecDeque;
use std::fmt;
use tracing::info;

/// Smallest and largest population in the recorded history
pub fn population_range(history: &VecDeque<u32>) -> Option<(u32, u32)> {
    let min = history.iter().copied().min()?;
    let max = history.iter().copied().max()?;
    Some((min, max))
}

/// Log one line per batch
pub fn log_batch(engine: &Engine) {
    let stats = engine.stats();
    let (low, high) = population_range(engine.history()).unwrap_or((0, 0));
    info!(
        cycle = stats.cycle,
        population = stats.population,
        mutations = stats.mutations,
        max_depth = stats.max_depth,
        mean_age = format_args!("{:.1}", stats.mean_age),
        owned = stats.owned_cells,
        recent_low = low,
        recent_high = high,
        "batch complete"
    );
}

/// Plain-text summary for `inspect`
pub struct Summary<'a>(pub &'a PopulationStats);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        writeln!(f, "cycle:        {}", stats.cycle)?;
        writeln!(f, "population:   {}", stats.population)?;
        writeln!(f, "mutations:    {}", stats.mutations)?;
        writeln!(f, "max depth:    {}", stats.max_depth)?;
        writeln!(f, "mean age:     {:.1}", stats.mean_age)?;
        write!(f, "owned cells:  {}", stats.owned_cells)
    }
}
