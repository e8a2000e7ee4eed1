//! k-means with N-ary natural initiation.

use anyhow::Result as AnyResult;
use nalgebra::DMatrix;
use rand::{rngs::StdRng, SeedableRng};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::bts::Comparison;
use crate::centroids::CentroidTable;
use crate::diversity::select_diverse;
use crate::kmeans::{default_local_trials, kmeans_plusplus, lloyd, random_centers, ClusterData};
use crate::scores::{self, Scores};
use crate::{BtsError, Metric};

/// Strategy for choosing the initial centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Initiator {
    /// Diversity selection inside the densest region of the data.
    #[default]
    CompSim,
    /// Diversity selection over all the data.
    DivSelect,
    /// Greedy k-means++.
    KmeansPlusPlus,
    /// k-means++ with a single trial per center.
    VanillaKmeansPlusPlus,
    Random,
}

impl Initiator {
    pub const ALL: [Initiator; 5] = [
        Initiator::CompSim,
        Initiator::DivSelect,
        Initiator::KmeansPlusPlus,
        Initiator::VanillaKmeansPlusPlus,
        Initiator::Random,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Initiator::CompSim => "comp_sim",
            Initiator::DivSelect => "div_select",
            Initiator::KmeansPlusPlus => "k-means++",
            Initiator::VanillaKmeansPlusPlus => "vanilla_k-means++",
            Initiator::Random => "random",
        }
    }

    /// Stem of the centroid file written for this initiator.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Initiator::CompSim => "comp_sim_centroids",
            Initiator::DivSelect => "div_sel_centroids",
            Initiator::KmeansPlusPlus => "kmeanspp_centroids",
            Initiator::VanillaKmeansPlusPlus => "vanilla_kmeanspp_centroids",
            Initiator::Random => "random_centroids",
        }
    }
}

impl fmt::Display for Initiator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Initiator {
    type Err = BtsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comp_sim" => Ok(Initiator::CompSim),
            "div_select" => Ok(Initiator::DivSelect),
            "k-means++" | "kmeans++" | "kmeans" => Ok(Initiator::KmeansPlusPlus),
            "vanilla_k-means++" | "vanilla_kmeans++" | "vanilla_kmeans" => {
                Ok(Initiator::VanillaKmeansPlusPlus)
            }
            "random" => Ok(Initiator::Random),
            _ => Err(BtsError::UnknownName {
                kind: "initiator",
                value: s.to_string(),
            }),
        }
    }
}

pub struct KmeansNani<'a> {
    data: &'a DMatrix<f64>,
    n_clusters: usize,
    comparison: Comparison,
    initiator: Initiator,
    percentage: usize,
    max_iter: usize,
    tol: f64,
    seed: Option<u64>,
}

impl<'a> KmeansNani<'a> {
    pub fn new(
        data: &'a DMatrix<f64>,
        n_clusters: usize,
        metric: Metric,
        n_atoms: usize,
        initiator: Initiator,
    ) -> Result<Self, BtsError> {
        let comparison = Comparison::new(metric, n_atoms)?;
        if data.nrows() == 0 {
            return Err(BtsError::EmptyData);
        }
        if n_clusters == 0 || n_clusters > data.nrows() {
            return Err(BtsError::InvalidClusterCount {
                n_clusters,
                n_samples: data.nrows(),
            });
        }
        Ok(Self {
            data,
            n_clusters,
            comparison,
            initiator,
            percentage: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: None,
        })
    }

    /// Share of the data, in percent, the comp_sim and div_select
    /// initiators draw from.
    pub fn with_percentage(mut self, percentage: usize) -> Self {
        self.percentage = percentage;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn available(&self) -> Result<usize, BtsError> {
        if self.percentage > 100 {
            return Err(BtsError::PercentageTooHigh(self.percentage));
        }
        let available = self.data.nrows() * self.percentage / 100;
        if available < self.n_clusters {
            return Err(BtsError::NotEnoughInitiators {
                found: available,
                needed: self.n_clusters,
            });
        }
        Ok(available)
    }

    /// Initial centers, one row per cluster.
    pub fn initiate_kmeans(&self) -> Result<DMatrix<f64>, BtsError> {
        let indices = match self.initiator {
            Initiator::CompSim => {
                let n_max = self.available()?;
                let comp_sims = self.comparison.complementary(self.data)?;
                let mut densest = (0..comp_sims.len()).collect::<Vec<_>>();
                densest.sort_by(|&a, &b| comp_sims[b].total_cmp(&comp_sims[a]));
                densest.truncate(n_max);
                let top = self.data.select_rows(densest.iter());
                let medoid = self.comparison.medoid(&top)?;
                let selected =
                    select_diverse(&top, self.n_clusters, &self.comparison, vec![medoid])?;
                selected.into_iter().map(|i| densest[i]).collect()
            }
            Initiator::DivSelect => {
                self.available()?;
                let medoid = self.comparison.medoid(self.data)?;
                select_diverse(self.data, self.n_clusters, &self.comparison, vec![medoid])?
            }
            Initiator::KmeansPlusPlus => kmeans_plusplus(
                self.data,
                self.n_clusters,
                default_local_trials(self.n_clusters),
                &mut self.rng(),
            )?,
            Initiator::VanillaKmeansPlusPlus => {
                kmeans_plusplus(self.data, self.n_clusters, 1, &mut self.rng())?
            }
            Initiator::Random => random_centers(self.data, self.n_clusters, &mut self.rng())?,
        };
        log::debug!("{} initiators: {:?}", self.initiator, indices);
        Ok(self.data.select_rows(indices.iter()))
    }

    /// Lloyd k-means from the first `n_clusters` rows of `initiators`.
    pub fn kmeans_clustering(&self, initiators: &DMatrix<f64>) -> Result<ClusterData, BtsError> {
        if initiators.nrows() < self.n_clusters {
            return Err(BtsError::NotEnoughInitiators {
                found: initiators.nrows(),
                needed: self.n_clusters,
            });
        }
        let centers = initiators.rows(0, self.n_clusters).clone_owned();
        lloyd(self.data, &centers, self.max_iter, self.tol)
    }

    pub fn execute(&self) -> Result<ClusterData, BtsError> {
        let initiators = self.initiate_kmeans()?;
        let result = self.kmeans_clustering(&initiators)?;
        log::info!(
            "{} clusters with {} initiators, {} iterations",
            self.n_clusters,
            self.initiator,
            result.n_iter
        );
        Ok(result)
    }

    /// Frame indices of every cluster, in frame order.
    pub fn create_cluster_list(&self, labels: &[usize]) -> Vec<Vec<usize>> {
        let mut clusters = vec![Vec::new(); self.n_clusters];
        for (i, &label) in labels.iter().enumerate() {
            if let Some(cluster) = clusters.get_mut(label) {
                cluster.push(i);
            }
        }
        clusters
    }

    pub fn compute_scores(&self, labels: &[usize]) -> Result<Scores, BtsError> {
        scores::compute_scores(self.data, labels)
    }

    pub fn write_centroids<P: AsRef<Path>>(&self, result: &ClusterData, path: P) -> AnyResult<()> {
        CentroidTable::new(&result.centers, result.n_iter).write(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{calculate_comp_sim, calculate_medoid};

    fn blobs() -> DMatrix<f64> {
        // three tight groups along x
        let xs = [
            0.0, 0.1, 0.2, 0.3, 0.15, 5.0, 5.1, 5.2, 5.3, 5.15, 11.0, 11.1, 11.2, 11.3, 11.15,
        ];
        DMatrix::from_fn(xs.len(), 2, |i, j| if j == 0 { xs[i] } else { 0.0 })
    }

    fn assert_three_groups(labels: &[usize]) {
        assert!(labels[..5].iter().all(|&l| l == labels[0]));
        assert!(labels[5..10].iter().all(|&l| l == labels[5]));
        assert!(labels[10..].iter().all(|&l| l == labels[10]));
        assert_ne!(labels[0], labels[5]);
        assert_ne!(labels[5], labels[10]);
        assert_ne!(labels[0], labels[10]);
    }

    #[test]
    fn test_every_initiator_finds_the_groups() {
        let data = blobs();
        for initiator in Initiator::ALL {
            let nani = KmeansNani::new(&data, 3, Metric::Msd, 1, initiator)
                .unwrap()
                .with_percentage(100)
                .with_seed(Some(3));
            let initiators = nani.initiate_kmeans().unwrap();
            assert_eq!(initiators.nrows(), 3);
            if initiator == Initiator::Random {
                continue;
            }
            let result = nani.kmeans_clustering(&initiators).unwrap();
            assert_three_groups(&result.labels);
        }
    }

    #[test]
    fn test_div_select_starts_at_medoid() {
        let data = blobs();
        let nani = KmeansNani::new(&data, 3, Metric::Msd, 1, Initiator::DivSelect)
            .unwrap()
            .with_percentage(100);
        let initiators = nani.initiate_kmeans().unwrap();
        // medoid 5.3 is closest to the mean, then the far end, then the near end
        let xs = initiators.column(0).iter().copied().collect::<Vec<_>>();
        assert_eq!(xs, vec![5.3, 11.3, 0.0]);
    }

    #[test]
    fn test_comp_sim_draws_from_densest_frames() {
        let data = DMatrix::from_fn(20, 2, |i, j| {
            if j == 0 {
                (i * i) as f64 / 4.0
            } else {
                ((i * 7) % 11) as f64
            }
        });
        let nani = KmeansNani::new(&data, 3, Metric::Msd, 1, Initiator::CompSim)
            .unwrap()
            .with_percentage(50);
        let initiators = nani.initiate_kmeans().unwrap();
        assert_eq!(initiators.nrows(), 3);

        let comp_sim = calculate_comp_sim(&data, Metric::Msd, 1).unwrap();
        let mut top = (0..20).collect::<Vec<_>>();
        top.sort_by(|&a, &b| comp_sim[b].total_cmp(&comp_sim[a]));
        top.truncate(10);
        let row_of = |r: usize| {
            (0..data.nrows())
                .find(|&i| data.row(i) == initiators.row(r))
                .unwrap()
        };
        let picked = (0..3).map(row_of).collect::<Vec<_>>();
        assert!(picked.iter().all(|i| top.contains(i)), "{picked:?} not in {top:?}");

        let medoid = calculate_medoid(&data.select_rows(top.iter()), Metric::Msd, 1).unwrap();
        assert_eq!(picked[0], top[medoid]);
        // the far end of the trajectory is never a candidate
        assert!(!picked.contains(&19));
    }

    #[test]
    fn test_comp_sim_needs_enough_frames() {
        let data = blobs();
        let nani = KmeansNani::new(&data, 3, Metric::Msd, 1, Initiator::CompSim).unwrap();
        // 10 % of 15 frames is a single frame
        assert_eq!(
            nani.initiate_kmeans(),
            Err(BtsError::NotEnoughInitiators {
                found: 1,
                needed: 3
            })
        );
        assert!(KmeansNani::new(&data, 16, Metric::Msd, 1, Initiator::CompSim).is_err());
    }

    #[test]
    fn test_cluster_list_and_scores() {
        let data = blobs();
        let nani = KmeansNani::new(&data, 3, Metric::Msd, 1, Initiator::DivSelect)
            .unwrap()
            .with_percentage(100);
        let result = nani.execute().unwrap();
        let clusters = nani.create_cluster_list(&result.labels);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters.iter().map(Vec::len).sum::<usize>(), 15);
        assert!(clusters.iter().all(|c| c.len() == 5));
        let scores = nani.compute_scores(&result.labels).unwrap();
        assert!(scores.ch > 100.0);
        assert!(scores.db < 0.1);
    }

    #[test]
    fn test_initiator_names() {
        for initiator in Initiator::ALL {
            assert_eq!(initiator.name().parse::<Initiator>(), Ok(initiator));
        }
        assert_eq!("kmeans".parse::<Initiator>(), Ok(Initiator::KmeansPlusPlus));
        assert_eq!(Initiator::DivSelect.file_prefix(), "div_sel_centroids");
        assert!("spectral".parse::<Initiator>().is_err());
    }
}
