use anyhow::{Context, Result};
use nalgebra::DMatrix;
use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};
use std::fs;
use std::path::Path;

fn to_matrix(array: &Array2<f64>) -> DMatrix<f64> {
    let (nrows, ncols) = array.dim();
    DMatrix::from_row_iterator(nrows, ncols, array.iter().copied())
}

/// Reads a 2-D `.npy` frame matrix. Floating point and integer dtypes are
/// converted to `f64`.
pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>> {
    let path = path.as_ref();
    let array = match read_npy::<_, Array2<f64>>(path) {
        Ok(array) => array,
        Err(f64_err) => read_npy::<_, Array2<f32>>(path)
            .map(|a| a.mapv(f64::from))
            .or_else(|_| read_npy::<_, Array2<i64>>(path).map(|a| a.mapv(|x| x as f64)))
            .or_else(|_| read_npy::<_, Array2<i32>>(path).map(|a| a.mapv(f64::from)))
            .map_err(|_| f64_err)
            .context(format!("Reading {}", path.to_string_lossy()))?,
    };
    log::debug!("loaded {:?} matrix from {}", array.dim(), path.to_string_lossy());
    Ok(to_matrix(&array))
}

/// Writes `data` as a C-ordered `f8` array, creating parent directories.
pub fn save_npy<P: AsRef<Path>>(path: P, data: &DMatrix<f64>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.to_string_lossy()))?;
    }
    let array = Array2::from_shape_fn(data.shape(), |(i, j)| data[(i, j)]);
    write_npy(path, &array).context(format!("Writing {}", path.to_string_lossy()))?;
    Ok(())
}
