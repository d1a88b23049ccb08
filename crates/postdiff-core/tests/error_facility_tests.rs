use postdiff_core::errors::{ExError, ExErrorKind, PostDiffError};
use std::error::Error as _;

#[test]
fn test_table_not_found_is_argument_error() {
    let ex_err: ExError = PostDiffError::TableNotFound {
        table: "Nope".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidArgument);
    assert_eq!(ex_err.code(), "ERR_INVALID_ARGUMENT");
    assert_eq!(ex_err.table(), Some("Nope"));
    assert_eq!(
        ex_err.message(),
        "[index-column][diff] table doesn't exist: <Nope>"
    );
}

#[test]
fn test_not_a_lexicon_names_kind() {
    let ex_err: ExError = PostDiffError::NotALexicon {
        table: "Docs".to_string(),
        kind: "table:no_key".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidArgument);
    assert!(ex_err.message().ends_with("<Docs>: table:no_key"));
}

#[test]
fn test_not_an_index_column_names_table_column_kind() {
    let ex_err: ExError = PostDiffError::NotAnIndexColumn {
        table: "Terms".to_string(),
        column: "title".to_string(),
        kind: "column:var_size".to_string(),
    }
    .into();

    assert_eq!(ex_err.table(), Some("Terms"));
    assert_eq!(ex_err.column(), Some("title"));
    assert_eq!(
        ex_err.message(),
        "[index-column][diff] column must be index column: <Terms>: <title>: column:var_size"
    );
}

#[test]
fn test_decode_and_key_errors_map_to_distinct_kinds() {
    let cases: Vec<(PostDiffError, ExErrorKind)> = vec![
        (
            PostDiffError::MisalignedPostingVector { len: 5, width: 3 },
            ExErrorKind::DecodeFailed,
        ),
        (
            PostDiffError::TokenKeyMissing {
                table: "Terms".to_string(),
                token_id: 9,
            },
            ExErrorKind::KeyLookupFailed,
        ),
        (
            PostDiffError::KeyTooLarge {
                table: "Terms".to_string(),
                token_id: 9,
                size: 10,
                capacity: 4,
            },
            ExErrorKind::KeyTooLarge,
        ),
        (
            PostDiffError::InvalidKey {
                table: "Terms".to_string(),
                token_id: 9,
                key_type: "ShortText".to_string(),
                reason: "bad utf-8".to_string(),
            },
            ExErrorKind::InvalidKey,
        ),
        (
            PostDiffError::OutputProtocol {
                reason: "extra member".to_string(),
            },
            ExErrorKind::OutputProtocol,
        ),
    ];

    for (err, kind) in cases {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), kind);
    }
}

#[test]
fn test_token_errors_carry_token_id() {
    let ex_err: ExError = PostDiffError::TokenKeyMissing {
        table: "Terms".to_string(),
        token_id: 42,
    }
    .into();

    assert_eq!(ex_err.token_id(), Some(42));
    assert!(ex_err.to_string().contains("(token_id: 42)"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::InvalidArgument, "ERR_INVALID_ARGUMENT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::DecodeFailed, "ERR_DECODE_FAILED"),
        (ExErrorKind::KeyLookupFailed, "ERR_KEY_LOOKUP_FAILED"),
        (ExErrorKind::KeyTooLarge, "ERR_KEY_TOO_LARGE"),
        (ExErrorKind::InvalidKey, "ERR_INVALID_KEY"),
        (ExErrorKind::OutputProtocol, "ERR_OUTPUT_PROTOCOL"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_source_chain_is_walkable() {
    let engine = ExError::new(ExErrorKind::ExternalService).with_message("engine exploded");
    let outer = ExError::new(ExErrorKind::ExternalService)
        .with_op("index_column_diff")
        .with_message("[index-column][diff] failed to diff: <Terms>: <index>: engine exploded")
        .with_source(engine);

    let source = outer.source().unwrap();
    assert!(source.to_string().contains("engine exploded"));
    assert_eq!(
        outer.source_error().map(ExError::kind),
        Some(ExErrorKind::ExternalService)
    );
}
