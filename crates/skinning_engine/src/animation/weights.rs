//! Skinning weight matrix

use nalgebra::DMatrix;

/// Influence of every bone on every vertex.
///
/// `rows` is the vertex count, `cols` the bone count. Rows are not required
/// to sum to one; each skinning algorithm decides how to treat them. Most
/// entries are zero in practice, so the per-bone and per-vertex iterators
/// skip zero weights.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    data: DMatrix<f32>,
}

impl Default for WeightMatrix {
    fn default() -> Self {
        Self::zeros(0, 0)
    }
}

impl WeightMatrix {
    /// All-zero matrix for `vertices` x `bones`
    pub fn zeros(vertices: usize, bones: usize) -> Self {
        Self {
            data: DMatrix::zeros(vertices, bones),
        }
    }

    /// Build from one row of bone weights per vertex.
    ///
    /// Every row must have `bones` entries.
    pub fn from_rows(bones: usize, rows: &[Vec<f32>]) -> Self {
        let mut weights = Self::zeros(rows.len(), bones);
        for (vertex, row) in rows.iter().enumerate() {
            debug_assert_eq!(row.len(), bones, "weight row {vertex} has the wrong bone count");
            for (bone, &weight) in row.iter().enumerate().take(bones) {
                weights.data[(vertex, bone)] = weight;
            }
        }
        weights
    }

    /// Number of vertices
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of bones
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Weight of `bone` on `vertex`
    pub fn get(&self, vertex: usize, bone: usize) -> f32 {
        self.data[(vertex, bone)]
    }

    /// Set the weight of `bone` on `vertex`
    pub fn set(&mut self, vertex: usize, bone: usize, weight: f32) {
        self.data[(vertex, bone)] = weight;
    }

    /// Vertices influenced by `bone`, with their weights
    pub fn bone_influences(&self, bone: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let column = self.data.column(bone);
        (0..self.rows()).filter_map(move |vertex| {
            let weight = column[vertex];
            (weight != 0.0).then_some((vertex, weight))
        })
    }

    /// Bones influencing `vertex`, with their weights
    pub fn vertex_influences(&self, vertex: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        let row = self.data.row(vertex);
        (0..self.cols()).filter_map(move |bone| {
            let weight = row[bone];
            (weight != 0.0).then_some((bone, weight))
        })
    }

    /// Sum of the weights of `vertex`
    pub fn row_sum(&self, vertex: usize) -> f32 {
        self.data.row(vertex).sum()
    }

    /// Number of non-zero entries
    pub fn non_zeros(&self) -> usize {
        self.data.iter().filter(|&&weight| weight != 0.0).count()
    }

    /// Scale every row so it sums to one; all-zero rows are left untouched
    pub fn normalize_rows(&mut self) {
        for mut row in self.data.row_iter_mut() {
            let sum = row.sum();
            if sum != 0.0 {
                row /= sum;
            }
        }
    }

    /// Zero every weight strictly below `epsilon`
    pub fn prune(&mut self, epsilon: f32) {
        self.data.apply(|weight| {
            if *weight < epsilon {
                *weight = 0.0;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_rows_layout() {
        let weights = WeightMatrix::from_rows(2, &[vec![1.0, 0.0], vec![0.25, 0.75], vec![0.0, 1.0]]);

        assert_eq!(weights.rows(), 3);
        assert_eq!(weights.cols(), 2);
        assert_eq!(weights.get(1, 1), 0.75);
        assert_eq!(weights.non_zeros(), 4);
    }

    #[test]
    fn test_influence_iterators_skip_zeros() {
        let weights = WeightMatrix::from_rows(3, &[vec![0.5, 0.0, 0.5], vec![0.0, 1.0, 0.0]]);

        let bone_two: Vec<_> = weights.bone_influences(2).collect();
        let vertex_zero: Vec<_> = weights.vertex_influences(0).collect();

        assert_eq!(bone_two, vec![(0, 0.5)]);
        assert_eq!(vertex_zero, vec![(0, 0.5), (2, 0.5)]);
    }

    #[test]
    fn test_prune_then_normalize() {
        let mut weights = WeightMatrix::from_rows(3, &[vec![0.05, 0.45, 0.5], vec![0.0, 0.0, 0.0]]);

        weights.prune(0.1);
        weights.normalize_rows();

        assert_eq!(weights.get(0, 0), 0.0);
        assert_relative_eq!(weights.row_sum(0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(weights.get(0, 2), 0.5 / 0.95, epsilon = 1e-6);
        assert_eq!(weights.row_sum(1), 0.0);
    }
}
