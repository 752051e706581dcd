use crate::error::Result;
use crate::index::{bucket_sizes, define_handle, index_insert, index_remove, Index};
use codescope_chunker::{ChunkKind, CodeChunk};
use serde::Serialize;
use std::collections::BTreeMap;

define_handle!(
    /// Handle of a stored chunk
    ChunkId,
    "chunk"
);

#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: BTreeMap<ChunkId, CodeChunk>,
    by_kind: Index<ChunkKind, ChunkId>,
    by_file: Index<String, ChunkId>,
    by_module: Index<String, ChunkId>,
    by_symbol: Index<String, ChunkId>,
    by_complexity: Index<u32, ChunkId>,
    next_id: u64,
}

impl ChunkStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, chunk: CodeChunk) -> ChunkId {
        let id = ChunkId(self.next_id);
        self.next_id += 1;

        index_insert(&mut self.by_kind, chunk.kind, id);
        index_insert(&mut self.by_file, chunk.file_path.clone(), id);
        index_insert(&mut self.by_module, chunk.module_path.clone(), id);
        if let Some(symbol) = &chunk.symbol_name {
            index_insert(&mut self.by_symbol, symbol.clone(), id);
        }
        if let Some(complexity) = chunk.complexity {
            index_insert(&mut self.by_complexity, complexity, id);
        }
        self.chunks.insert(id, chunk);
        id
    }

    #[must_use]
    pub fn get(&self, id: ChunkId) -> Option<&CodeChunk> {
        self.chunks.get(&id)
    }

    #[must_use]
    pub fn find_by_kind(&self, kind: ChunkKind) -> Vec<&CodeChunk> {
        self.resolve(self.by_kind.get(&kind).into_iter().flatten())
    }

    #[must_use]
    pub fn find_by_file(&self, file_path: &str) -> Vec<&CodeChunk> {
        self.resolve(self.by_file.get(file_path).into_iter().flatten())
    }

    #[must_use]
    pub fn find_by_module(&self, module_path: &str) -> Vec<&CodeChunk> {
        self.resolve(self.by_module.get(module_path).into_iter().flatten())
    }

    #[must_use]
    pub fn find_by_symbol(&self, symbol_name: &str) -> Vec<&CodeChunk> {
        self.resolve(self.by_symbol.get(symbol_name).into_iter().flatten())
    }

    /// Chunks with a complexity score in `min..=max`, in insertion order
    #[must_use]
    pub fn find_by_complexity_range(&self, min: u32, max: u32) -> Vec<&CodeChunk> {
        if min > max {
            return Vec::new();
        }
        let mut ids: Vec<ChunkId> = self
            .by_complexity
            .range(min..=max)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort_unstable();
        self.resolve(ids.iter())
    }

    /// Chunks spanning at least `min_lines` lines
    #[must_use]
    pub fn find_large_chunks(&self, min_lines: usize) -> Vec<&CodeChunk> {
        self.chunks
            .values()
            .filter(|chunk| chunk.line_count() >= min_lines)
            .collect()
    }

    #[must_use]
    pub fn get_all(&self) -> Vec<&CodeChunk> {
        self.chunks.values().collect()
    }

    /// Iterate handles alongside their chunks
    pub fn iter(&self) -> impl Iterator<Item = (ChunkId, &CodeChunk)> {
        self.chunks.iter().map(|(id, chunk)| (*id, chunk))
    }

    pub fn delete(&mut self, id: ChunkId) -> Result<CodeChunk> {
        let chunk = self.chunks.remove(&id).ok_or_else(|| id.unknown())?;
        index_remove(&mut self.by_kind, &chunk.kind, &id);
        index_remove(&mut self.by_file, chunk.file_path.as_str(), &id);
        index_remove(&mut self.by_module, chunk.module_path.as_str(), &id);
        if let Some(symbol) = &chunk.symbol_name {
            index_remove(&mut self.by_symbol, symbol.as_str(), &id);
        }
        if let Some(complexity) = chunk.complexity {
            index_remove(&mut self.by_complexity, &complexity, &id);
        }
        Ok(chunk)
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.by_kind.clear();
        self.by_file.clear();
        self.by_module.clear();
        self.by_symbol.clear();
        self.by_complexity.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[must_use]
    pub fn statistics(&self) -> ChunkStatistics {
        let complexities: Vec<usize> = self
            .chunks
            .values()
            .filter_map(|chunk| chunk.complexity)
            .map(|c| c as usize)
            .collect();
        let lines: Vec<usize> = self.chunks.values().map(CodeChunk::line_count).collect();
        let characters: Vec<usize> = self
            .chunks
            .values()
            .map(CodeChunk::character_count)
            .collect();

        ChunkStatistics {
            total_chunks: self.chunks.len(),
            chunks_by_kind: bucket_sizes(&self.by_kind, |kind| kind.as_str().to_string()),
            chunks_by_file: bucket_sizes(&self.by_file, String::clone),
            chunks_by_module: bucket_sizes(&self.by_module, String::clone),
            complexity: ComplexityStatistics {
                summary: Summary::of(&complexities),
                distribution: bucket_sizes(&self.by_complexity, u32::to_string),
            },
            lines: Summary::of(&lines),
            characters: Summary::of(&characters),
        }
    }

    fn resolve<'a>(&self, ids: impl Iterator<Item = &'a ChunkId>) -> Vec<&CodeChunk> {
        ids.filter_map(|id| self.chunks.get(id)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkStatistics {
    pub total_chunks: usize,
    pub chunks_by_kind: BTreeMap<String, usize>,
    pub chunks_by_file: BTreeMap<String, usize>,
    pub chunks_by_module: BTreeMap<String, usize>,
    pub complexity: ComplexityStatistics,
    pub lines: Summary,
    pub characters: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityStatistics {
    #[serde(flatten)]
    pub summary: Summary,
    /// Score → number of chunks
    pub distribution: BTreeMap<String, usize>,
}

/// Average, maximum and minimum of a sample; all zero when it is empty
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub average: f64,
    pub max: usize,
    pub min: usize,
}

impl Summary {
    #[must_use]
    pub fn of(values: &[usize]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let total: usize = values.iter().sum();
        Self {
            average: total as f64 / values.len() as f64,
            max: values.iter().copied().max().unwrap_or(0),
            min: values.iter().copied().min().unwrap_or(0),
        }
    }
}
