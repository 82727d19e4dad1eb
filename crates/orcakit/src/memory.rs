//! Rough memory requirements for ORCA jobs. The model assumes the keyword
//! template is a geometry optimization.

use crate::geom::Xyz;

/// the smallest estimate ever returned, in MB
pub const MIN_MEMORY: usize = 2;

/// MB per atom for each periodic table row
const PER_ATOM: [usize; 6] = [0, 100, 100, 100, 100, 100];

/// fixed overhead in MB
const BASE: usize = 1000;

/// estimate the memory per core in MB needed for a molecule with `counts`
/// atoms in each row of the periodic table
pub fn estimate(counts: [usize; 6]) -> usize {
    let est = counts
        .iter()
        .zip(PER_ATOM)
        .map(|(n, m)| n * m)
        .sum::<usize>()
        + BASE;
    est.max(MIN_MEMORY)
}

/// the largest estimate over `geoms`, or None if `geoms` is empty
pub fn estimate_max<'a>(
    geoms: impl IntoIterator<Item = &'a Xyz>,
) -> Option<usize> {
    geoms.into_iter().map(|g| estimate(g.row_counts())).max()
}

/// total memory in GB for `ncores` cores with `per_core` MB each, rounded up
pub fn total_gb(per_core: usize, ncores: usize) -> usize {
    (per_core * ncores).div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    #[test_case([0; 6], 1000; "empty")]
    #[test_case([2, 0, 0, 0, 0, 0], 1000; "hydrogen is free")]
    #[test_case([2, 1, 0, 0, 0, 0], 1100; "water")]
    #[test_case([12, 6, 1, 1, 1, 2], 2100; "mixed rows")]
    fn estimates(counts: [usize; 6], want: usize) {
        assert_eq!(estimate(counts), want);
    }

    #[test_case(1000, 8, 8)]
    #[test_case(1100, 8, 9)]
    #[test_case(2000, 60, 120)]
    #[test_case(2001, 60, 121)]
    fn totals(per_core: usize, ncores: usize, want: usize) {
        assert_eq!(total_gb(per_core, ncores), want);
    }

    #[test]
    fn max_over_geoms() {
        let water: Xyz = "3\n\nO 0 0 0\nH 0 0 1\nH 0 1 0\n".parse().unwrap();
        let nickel: Xyz = "2\n\nNi 0 0 0\nC 0 0 2\n".parse().unwrap();
        assert_eq!(estimate_max([&water, &nickel]), Some(1200));
        assert_eq!(estimate_max(Vec::<&Xyz>::new()), None);
    }
}
