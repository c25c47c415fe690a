use std::{collections::BTreeMap, path::PathBuf};

use blockfall_engine::{ShapeKind, random_shape};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CatalogArg {
    /// Number of shapes to draw
    #[arg(long, default_value_t = 10000)]
    samples: usize,
    /// Seed for the generator
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct OrientationCount {
    kind: ShapeKind,
    cells: Vec<String>,
    count: usize,
}

pub(crate) fn run(arg: &CatalogArg) -> anyhow::Result<()> {
    let CatalogArg {
        samples,
        seed,
        output,
    } = arg;

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_os_rng(),
    };
    let counts = count_orientations(&mut rng, *samples);
    tracing::info!(samples, orientations = counts.len(), "catalog sampled");
    Output::save_json(&counts, output.clone())?;
    Ok(())
}

/// Draws `samples` shapes and counts each distinct orientation, grouped by kind.
fn count_orientations<R>(rng: &mut R, samples: usize) -> Vec<OrientationCount>
where
    R: Rng + ?Sized,
{
    let mut counts = BTreeMap::<(u8, String), usize>::new();
    for _ in 0..samples {
        let shape = random_shape(rng);
        *counts
            .entry((shape.kind() as u8, shape.to_string()))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((kind, text), count)| OrientationCount {
            kind: ShapeKind::ALL[usize::from(kind)],
            cells: text.lines().map(str::to_owned).collect(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_add_up() {
        let mut rng = Pcg32::seed_from_u64(1);
        let counts = count_orientations(&mut rng, 2000);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 2000);
        for kind in ShapeKind::ALL {
            let orientations = counts.iter().filter(|c| c.kind == kind).count();
            assert!((1..=4).contains(&orientations), "{kind:?}: {orientations}");
        }
    }

    #[test]
    fn test_square_has_one_orientation() {
        let mut rng = Pcg32::seed_from_u64(2);
        let counts = count_orientations(&mut rng, 500);
        let squares = counts
            .iter()
            .filter(|c| c.kind == ShapeKind::O)
            .collect::<Vec<_>>();
        assert_eq!(squares.len(), 1);
        assert_eq!(squares[0].cells, ["##", "##"]);
    }
}
