use crate::domain::model::FatArticle;
use crate::utils::error::{EtlError, Result};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};

/// Sparse, symmetric co-authorship matrix in CSR layout.
///
/// Rows and columns are author ids. Entry `(i, j)` is the number of articles
/// authors `i` and `j` wrote together; the diagonal is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoauthorshipMatrix {
    dimension: usize,
    indptr: Vec<usize>,
    indices: Vec<u32>,
    data: Vec<u32>,
}

impl CoauthorshipMatrix {
    /// Builds the matrix from resolved articles. `dimension` is grown if an
    /// author id falls outside it.
    pub fn from_fat_articles(articles: &[FatArticle], dimension: usize) -> Self {
        let dimension = articles
            .iter()
            .flat_map(|a| a.authors.iter())
            .map(|a| a.id as usize + 1)
            .fold(dimension, usize::max);

        let mut rows: Vec<BTreeMap<u32, u32>> = vec![BTreeMap::new(); dimension];
        for article in articles {
            for author in &article.authors {
                for coauthor in &article.authors {
                    if author.id == coauthor.id
                        || (author.orcid().is_some() && author.orcid() == coauthor.orcid())
                    {
                        continue;
                    }
                    *rows[author.id as usize].entry(coauthor.id).or_insert(0) += 1;
                }
            }
        }

        let mut indptr = Vec::with_capacity(dimension + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);
        for row in rows {
            for (col, papers) in row {
                indices.push(col);
                data.push(papers);
            }
            indptr.push(indices.len());
        }

        tracing::debug!(
            "Built {}x{} co-authorship matrix with {} non-zero entries",
            dimension,
            dimension,
            data.len()
        );

        Self {
            dimension,
            indptr,
            indices,
            data,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    fn row(&self, i: usize) -> (&[u32], &[u32]) {
        let (start, end) = (self.indptr[i], self.indptr[i + 1]);
        (&self.indices[start..end], &self.data[start..end])
    }

    fn check_index(&self, id: u32) -> Result<usize> {
        let i = id as usize;
        if i < self.dimension {
            Ok(i)
        } else {
            Err(EtlError::not_found("Author", id))
        }
    }

    /// Number of co-authored articles; zero outside the matrix.
    pub fn get(&self, i: u32, j: u32) -> u32 {
        if i as usize >= self.dimension {
            return 0;
        }
        let (cols, vals) = self.row(i as usize);
        cols.binary_search(&j).map(|k| vals[k]).unwrap_or(0)
    }

    /// Co-authors of `i` with the number of shared articles.
    pub fn neighbours(&self, i: u32) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (cols, vals) = if (i as usize) < self.dimension {
            self.row(i as usize)
        } else {
            (&[][..], &[][..])
        };
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// Stored entries as `(row, col, papers)` in row-major order.
    pub fn triplets(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        (0..self.dimension).flat_map(move |i| {
            let (cols, vals) = self.row(i);
            cols.iter()
                .zip(vals.iter())
                .map(move |(&col, &papers)| (i as u32, col, papers))
        })
    }

    pub fn is_symmetric(&self) -> bool {
        self.triplets().all(|(i, j, v)| self.get(j, i) == v)
    }

    /// Erdős number: fewest co-authorship hops from `from` to `to`.
    pub fn erdos_number(&self, from: u32, to: u32) -> Result<u32> {
        let start = self.check_index(from)?;
        let target = self.check_index(to)?;
        if start == target {
            return Ok(0);
        }

        let mut hops: Vec<Option<u32>> = vec![None; self.dimension];
        hops[start] = Some(0);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let next_hops = hops[current].unwrap_or(0) + 1;
            for (neighbour, _) in self.neighbours(current as u32) {
                let n = neighbour as usize;
                if hops[n].is_some() {
                    continue;
                }
                if n == target {
                    return Ok(next_hops);
                }
                hops[n] = Some(next_hops);
                queue.push_back(n);
            }
        }

        Err(EtlError::NoPathError { from, to })
    }

    /// Shortest path using the shared-article counts as edge weights.
    pub fn weighted_distance(&self, from: u32, to: u32) -> Result<u64> {
        let start = self.check_index(from)?;
        let target = self.check_index(to)?;

        let mut dist: Vec<Option<u64>> = vec![None; self.dimension];
        dist[start] = Some(0);
        let mut heap = BinaryHeap::from([Reverse((0u64, start))]);

        while let Some(Reverse((d, current))) = heap.pop() {
            if current == target {
                return Ok(d);
            }
            if dist[current].is_some_and(|best| d > best) {
                continue;
            }
            for (neighbour, papers) in self.neighbours(current as u32) {
                let n = neighbour as usize;
                let candidate = d + u64::from(papers);
                if dist[n].map_or(true, |best| candidate < best) {
                    dist[n] = Some(candidate);
                    heap.push(Reverse((candidate, n)));
                }
            }
        }

        Err(EtlError::NoPathError { from, to })
    }
}
