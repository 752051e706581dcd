use codescope_chunker::{keys, merge_chunks, Chunker, ChunkerConfig, ChunkingMode, CodeChunk};
use codescope_syntax::{PythonTreeProvider, TreeProvider};
use pretty_assertions::assert_eq;

const SOURCE: &str = r#"
class UserService:
    def validate_user_token(self, token):
        return token is not None

    def compute_total(self, items):
        total = 0
        for item in items:
            if item.price > 0 and item.active:
                total += item.price
        return total


def fetch_data_from_api(url):
    """Serialize data for the response."""
    return url
"#;

fn chunk(mode: ChunkingMode) -> Vec<CodeChunk> {
    let tree = PythonTreeProvider::new().unwrap().parse(SOURCE).unwrap();
    let config = ChunkerConfig {
        mode,
        ..Default::default()
    };
    Chunker::new(config)
        .unwrap()
        .chunk_tree(&tree, "service.py", "service")
        .unwrap()
}

fn find<'a>(chunks: &'a [CodeChunk], name: &str, semantic: bool) -> Option<&'a CodeChunk> {
    chunks
        .iter()
        .find(|c| c.symbol_name.as_deref() == Some(name) && c.is_semantic() == semantic)
}

#[test]
fn validate_user_token_is_authentication_and_compute_total_is_structural() {
    let chunks = chunk(ChunkingMode::Hybrid);

    let token = find(&chunks, "validate_user_token", true).expect("semantic chunk");
    assert_eq!(token.metadata_str(keys::SEMANTIC_TYPE), Some("authentication"));
    assert!(find(&chunks, "validate_user_token", false).is_none());

    assert!(find(&chunks, "compute_total", true).is_none());
    let total = find(&chunks, "compute_total", false).expect("structural chunk");
    assert_eq!(total.complexity, Some(2));
}

#[test]
fn doc_comment_contributes_key_phrases() {
    let chunks = chunk(ChunkingMode::Semantic);
    let fetch = find(&chunks, "fetch_data_from_api", true).unwrap();
    // database matches on the name, api on the doc comment
    assert_eq!(fetch.metadata_str(keys::SEMANTIC_TYPE), Some("api"));
    assert_eq!(
        fetch.get_metadata(keys::KEY_PHRASES).unwrap(),
        &serde_json::json!(["fetch.*data", "serialize.*data"])
    );
}

#[test]
fn merge_of_merged_output_is_stable() {
    let semantic = chunk(ChunkingMode::Semantic);
    let structural = chunk(ChunkingMode::Structural);
    let once = merge_chunks(semantic.clone(), structural.clone());

    let (sem, rest): (Vec<_>, Vec<_>) = once.iter().cloned().partition(CodeChunk::is_semantic);
    let twice = merge_chunks(sem, rest);

    let key = |c: &CodeChunk| (c.symbol_name.clone(), c.start_line, c.is_semantic());
    assert_eq!(
        once.iter().map(key).collect::<Vec<_>>(),
        twice.iter().map(key).collect::<Vec<_>>()
    );
    assert_eq!(once.len(), structural.len());
}

#[test]
fn chunks_respect_range_invariants() {
    for chunk in chunk(ChunkingMode::Hybrid) {
        assert!(chunk.start_line <= chunk.end_line);
        assert!(!chunk.content.is_empty());
        assert_eq!(chunk.content.lines().count(), chunk.line_count());
    }
}
