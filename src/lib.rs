mod bts;
mod centroids;
mod diversity;
mod dump;
mod error;
mod esim;
mod format;
mod isim;
mod kmeans;
mod math;
mod metric;
mod nani;
mod npy;
mod scores;
mod selection;
mod topology;
mod trajectory;
mod trim;
mod xyz;

pub use bts::{
    calculate_comp_sim, calculate_medoid, calculate_outlier, condensed_comparison,
    extended_comparison, frame, mean_square_deviation, msd_condensed, Comparison, Condensed,
};
pub use centroids::{compare_tables, read_table, CentroidTable, TableDiff};
pub use diversity::{diversity_selection, get_new_index_n, select_diverse, DiversitySeed};
pub use dump::{parse_dump, read_dump, DumpSnapshot, SymBox};
pub use error::BtsError;
pub use esim::{calculate_counters, gen_sim_indices, Counters, Indices, Threshold, WFactor};
pub use format::{brief, brief_matrix};
pub use isim::{
    calculate_isim, column_totals, gen_isim_indices, isim_counters, IsimCounters, IsimIndices,
};
pub use kmeans::{
    assign_labels, default_local_trials, kmeans_plusplus, lloyd, random_centers, ClusterData,
};
pub use math::{argsort, IteratorArgExt, IteratorAvg};
pub use metric::Metric;
pub use nani::{Initiator, KmeansNani};
pub use npy::{load_npy, save_npy};
pub use scores::{calinski_harabasz_score, compute_scores, davies_bouldin_score, Scores};
pub use selection::{Selection, SelectionError, Span};
pub use topology::{parse_pdb_frames, Atom, Topology};
pub use trajectory::{
    frames_to_matrix, gen_traj_numpy, read_trajectory, Frame, TrajectoryError, TrajectoryFormat,
};
pub use trim::{outlier_indices, trim_outliers, Criterion, TrimAmount};
pub use xyz::parse_xyz;
