//! Endpoint view over a document's cluster list

use serde_json::Value;

use super::CLUSTERS;
use crate::error::{MergeError, MergeResult};

/// Mutable view of one endpoint's `clusters` array
#[derive(Debug)]
pub struct Endpoint<'a> {
    index: usize,
    name: Option<String>,
    clusters: &'a mut Vec<Value>,
}

impl<'a> Endpoint<'a> {
    pub(crate) fn bind(index: usize, endpoint: &'a mut Value) -> MergeResult<Self> {
        let name = endpoint.get("name").and_then(Value::as_str).map(str::to_string);

        let clusters = endpoint
            .get_mut(CLUSTERS)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| {
                MergeError::schema(format!("no endpoints: endpoint {} has no cluster list", index))
            })?;

        Ok(Self {
            index,
            name,
            clusters,
        })
    }

    /// Position of the endpoint in `endpointTypes`
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn clusters(&self) -> &[Value] {
        self.clusters.as_slice()
    }

    pub(crate) fn clusters_mut(&mut self) -> &mut Vec<Value> {
        &mut *self.clusters
    }

    /// Code of the cluster at `position`, validated as an unsigned 16-bit value
    pub fn cluster_code(&self, position: usize) -> MergeResult<u16> {
        let cluster = self.clusters.get(position).ok_or_else(|| {
            MergeError::schema(format!(
                "endpoint {} has no cluster at position {}",
                self.index, position
            ))
        })?;

        let code = cluster
            .as_object()
            .and_then(|c| c.get("code"))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                MergeError::schema(format!(
                    "endpoint {} cluster #{} has no numeric 'code'",
                    self.index, position
                ))
            })?;

        u16::try_from(code).map_err(|_| {
            MergeError::schema(format!(
                "endpoint {} cluster #{} code {} exceeds 16 bits",
                self.index, position, code
            ))
        })
    }

    /// Codes of all clusters in document order
    pub fn cluster_codes(&self) -> MergeResult<Vec<u16>> {
        (0..self.clusters.len()).map(|i| self.cluster_code(i)).collect()
    }

    /// Linear scan for a cluster with `code`.
    ///
    /// A code that occurs more than once is reported as a schema error, since
    /// the merge could not tell which record to update.
    pub fn find_cluster(&self, code: u16) -> MergeResult<Option<usize>> {
        let hits: Vec<usize> = self
            .cluster_codes()?
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == code)
            .map(|(i, _)| i)
            .collect();

        if hits.len() > 1 {
            return Err(MergeError::schema(format!(
                "cluster {:#06x} appears {} times in endpoint {}",
                code,
                hits.len(),
                self.index
            )));
        }

        Ok(hits.first().copied())
    }
}
