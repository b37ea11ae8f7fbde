//! Job descriptors
//!
//! A job supplies the pure functions a run needs: a mapper applied to every
//! record, a reducer applied to every group, and an output shaper applied to
//! the final result by the request layer. The engine never calls the mapper or
//! reducer itself; workers resolve them through the [`JobRegistry`].

pub mod builtin;
pub mod error;
mod registry;

pub use error::{JobError, JobResult};
pub use registry::JobRegistry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::worker::protocol::Phase;

/// Identifier of a registered job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(JobId)
    }
}

/// A `[key, value]` pair emitted by a mapper or a reducer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair(pub Value, pub Value);

impl Pair {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self(key.into(), value.into())
    }

    pub fn key(&self) -> &Value {
        &self.0
    }

    pub fn value(&self) -> &Value {
        &self.1
    }

    /// The pair as a two-element JSON array
    pub fn into_value(self) -> Value {
        Value::Array(vec![self.0, self.1])
    }
}

/// A `[key, [values...]]` group handed to a reducer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group(pub Value, pub Vec<Value>);

impl Group {
    pub fn key(&self) -> &Value {
        &self.0
    }

    pub fn values(&self) -> &[Value] {
        &self.1
    }
}

pub type MapFn = Arc<dyn Fn(&Value) -> JobResult<Pair> + Send + Sync>;
pub type ReduceFn = Arc<dyn Fn(&Group) -> JobResult<Pair> + Send + Sync>;
pub type OutputFn = Arc<dyn Fn(Vec<Pair>) -> Value + Send + Sync>;

/// Capability set of one job
#[derive(Clone)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub endpoint: String,
    mapper: MapFn,
    reducer: ReduceFn,
    to_output: OutputFn,
}

impl Job {
    pub fn new<M, R, O>(
        id: JobId,
        name: impl Into<String>,
        endpoint: impl Into<String>,
        mapper: M,
        reducer: R,
        to_output: O,
    ) -> Self
    where
        M: Fn(&Value) -> JobResult<Pair> + Send + Sync + 'static,
        R: Fn(&Group) -> JobResult<Pair> + Send + Sync + 'static,
        O: Fn(Vec<Pair>) -> Value + Send + Sync + 'static,
    {
        Self {
            id,
            name: name.into(),
            endpoint: endpoint.into(),
            mapper: Arc::new(mapper),
            reducer: Arc::new(reducer),
            to_output: Arc::new(to_output),
        }
    }

    /// Apply the mapper to one record
    pub fn map(&self, record: &Value) -> JobResult<Pair> {
        (self.mapper)(record)
    }

    /// Apply the reducer to one group
    pub fn reduce(&self, group: &Group) -> JobResult<Pair> {
        (self.reducer)(group)
    }

    /// Apply the function designated for `phase` to one stored element.
    ///
    /// Reduce-phase elements arrive as raw JSON and must decode as a [`Group`].
    pub fn apply(&self, phase: Phase, element: &Value) -> JobResult<Pair> {
        match phase {
            Phase::Map => self.map(element),
            Phase::Reduce => {
                let group: Group = serde_json::from_value(element.clone())
                    .map_err(|e| JobError::InvalidGroup(e.to_string()))?;
                self.reduce(&group)
            }
        }
    }

    /// Shape a final result into the job's response body
    pub fn shape_output(&self, results: Vec<Pair>) -> Value {
        (self.to_output)(results)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
