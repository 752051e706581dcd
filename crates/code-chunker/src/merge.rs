use crate::types::CodeChunk;
use std::collections::HashSet;

/// Combine the two passes: every semantic chunk is kept, followed by the
/// structural chunks that no semantic chunk shadows.
///
/// A structural chunk is shadowed only when a semantic chunk has exactly the
/// same symbol name and start line. Merging an already merged result again is
/// a no-op.
#[must_use]
pub fn merge_chunks(semantic: Vec<CodeChunk>, structural: Vec<CodeChunk>) -> Vec<CodeChunk> {
    let shadowed: HashSet<(Option<String>, usize)> = semantic
        .iter()
        .map(|chunk| (chunk.symbol_name.clone(), chunk.start_line))
        .collect();

    let mut merged = semantic;
    merged.extend(
        structural
            .into_iter()
            .filter(|chunk| !shadowed.contains(&(chunk.symbol_name.clone(), chunk.start_line))),
    );
    merged
}
