//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{IndexSummary, SearchHit, SearchMode, chunk_text};
    use insta::assert_yaml_snapshot;

    #[test]
    fn test_index_summary_snapshot() {
        let summary = IndexSummary {
            index: "docs".to_string(),
            description: "test".to_string(),
        };

        assert_yaml_snapshot!(summary, @r###"
        ---
        index: docs
        description: test
        "###);
    }

    #[test]
    fn test_search_hit_snapshot() {
        let hit = SearchHit {
            description: "notes.txt - chunk 1".to_string(),
            content: "hello".to_string(),
            score: 0.5,
        };

        assert_yaml_snapshot!(hit, @r###"
        ---
        description: notes.txt - chunk 1
        content: hello
        score: 0.5
        "###);
    }

    #[test]
    fn test_search_mode_snapshot() {
        assert_yaml_snapshot!(SearchMode::Knn { num_candidates: 100 }, @r###"
        ---
        knn:
          num_candidates: 100
        "###);
    }

    #[test]
    fn test_chunks_snapshot() {
        let chunks = chunk_text("hello world", 5).unwrap();

        assert_yaml_snapshot!(chunks, @r###"
        ---
        - hello
        - " worl"
        - d
        "###);
    }
}
