use std::iter;

pub trait IteratorAvg<T>: Iterator<Item = T> {
    fn avg(self) -> Option<T>;
    fn avg_with_var(self) -> Option<(T, T)>;
    fn var(self) -> Option<T>;
}

macro_rules! impl_avg {
    ($($a:ident)*) => ($(
        impl<I> IteratorAvg<$a> for I
        where
            I: Iterator<Item = $a>,
        {
            fn avg(self) -> Option<$a> {
                iter::zip(self, 1usize..)
                    .reduce(|(sum, _), (next, cnt)| (sum + next, cnt))
                    .map(|(sum, cnt)| sum / cnt as $a)
            }

            fn avg_with_var(self) -> Option<($a, $a)> {
                let values = self.collect::<Vec<_>>();
                let avg = values.iter().copied().avg()?;
                values
                    .into_iter()
                    .map(|x| (x - avg).powi(2))
                    .avg()
                    .map(|var| (avg, var))
            }

            fn var(self) -> Option<$a> {
                self.avg_with_var().map(|(_, var)| var)
            }
        }
    )*)
}

impl_avg! { f32 f64 }

/// Position of the first maximum / minimum, NaN values are skipped.
pub trait IteratorArgExt<T>: Iterator<Item = T> {
    fn arg_max(self) -> Option<usize>;
    fn arg_min(self) -> Option<usize>;
}

macro_rules! impl_arg {
    ($($a:ident)*) => ($(
        impl<I> IteratorArgExt<$a> for I
        where
            I: Iterator<Item = $a>,
        {
            fn arg_max(self) -> Option<usize> {
                self.enumerate()
                    .filter(|(_, v)| !v.is_nan())
                    .fold(None, |best: Option<(usize, $a)>, (i, v)| match best {
                        Some((_, b)) if v <= b => best,
                        _ => Some((i, v)),
                    })
                    .map(|(i, _)| i)
            }

            fn arg_min(self) -> Option<usize> {
                self.enumerate()
                    .filter(|(_, v)| !v.is_nan())
                    .fold(None, |best: Option<(usize, $a)>, (i, v)| match best {
                        Some((_, b)) if v >= b => best,
                        _ => Some((i, v)),
                    })
                    .map(|(i, _)| i)
            }
        }
    )*)
}

impl_arg! { f32 f64 }

/// Indices of `values` sorted ascending; equal values keep their order.
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_f64_near;

    #[test]
    fn test_iterator_avg_f64() {
        let data: Vec<f64> = vec![];
        let avg = data.iter().copied().avg();
        let var = data.iter().copied().var();
        assert!(avg.is_none());
        assert!(var.is_none());
        let data: Vec<f64> = vec![5.0];
        let avg = data.iter().copied().avg();
        let var = data.iter().copied().var();
        assert!(avg.is_some());
        assert_f64_near!(avg.unwrap(), 5.0, 6);
        assert!(var.is_some());
        assert_f64_near!(var.unwrap(), 0.0, 6);
        let data: Vec<f64> = vec![1.0, 2.0, 3.0];
        let (avg, var) = data.iter().copied().avg_with_var().unwrap();
        assert_f64_near!(avg, 2.0, 6);
        assert_f64_near!(var, 2.0 / 3.0, 6);
    }

    #[test]
    fn test_arg_extrema() {
        let data = [3.0, 7.0, 1.0, 7.0, 1.0];
        assert_eq!(data.iter().copied().arg_max(), Some(1));
        assert_eq!(data.iter().copied().arg_min(), Some(2));
        let data = [f64::NAN, 2.0, 5.0];
        assert_eq!(data.iter().copied().arg_max(), Some(2));
        assert_eq!(data.iter().copied().arg_min(), Some(1));
        assert_eq!(std::iter::empty::<f64>().arg_max(), None);
    }

    #[test]
    fn test_argsort_is_stable() {
        assert_eq!(argsort(&[2.0, 1.0, 2.0, 0.5]), vec![3, 1, 0, 2]);
    }
}
