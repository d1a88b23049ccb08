mod common;

use common::{diff, terms, terms_catalog};
use postdiff_core::catalog::{Catalog, KeyType, MemoryCatalog};
use postdiff_core::errors::ExErrorKind;
use postdiff_core::report::{JsonStreamWriter, JsonTreeWriter};
use postdiff_core::{build_report, ColumnFlags, DiffCollection, DiffReportBuilder, MissingKeyPolicy};
use serde_json::{json, Value};

#[test]
fn test_section_and_position_report() {
    let catalog = terms_catalog(ColumnFlags::WITH_SECTION | ColumnFlags::WITH_POSITION);
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![10, 1, 5, 20, 2, 7], vec![])]);

    let report = build_report(
        &diff,
        lexicon.as_ref(),
        ColumnFlags::WITH_SECTION | ColumnFlags::WITH_POSITION,
    )
    .unwrap();

    assert_eq!(
        report,
        json!({"diffs": [{
            "token": {"id": 1, "value": "hello"},
            "remains": [
                {"record_id": 10, "section_id": 1, "position": 5},
                {"record_id": 20, "section_id": 2, "position": 7}
            ],
            "missings": []
        }]})
    );
}

#[test]
fn test_record_only_report() {
    let catalog = terms_catalog(ColumnFlags::empty());
    let lexicon = terms(&catalog);
    let diff = diff(vec![(2, vec![], vec![3, 4])]);

    let report = build_report(&diff, lexicon.as_ref(), ColumnFlags::empty()).unwrap();

    assert_eq!(
        report,
        json!({"diffs": [{
            "token": {"id": 2, "value": "world"},
            "remains": [],
            "missings": [{"record_id": 3}, {"record_id": 4}]
        }]})
    );
}

#[test]
fn test_weight_flag_does_not_change_posting_shape() {
    let catalog = terms_catalog(ColumnFlags::WITH_WEIGHT);
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![8], vec![])]);

    let report = build_report(&diff, lexicon.as_ref(), ColumnFlags::WITH_WEIGHT).unwrap();
    assert_eq!(report["diffs"][0]["remains"], json!([{"record_id": 8}]));
}

#[test]
fn test_empty_collection_yields_empty_diffs() {
    let catalog = terms_catalog(ColumnFlags::WITH_POSITION);
    let lexicon = terms(&catalog);

    let report = build_report(
        &DiffCollection::new(),
        lexicon.as_ref(),
        ColumnFlags::WITH_POSITION,
    )
    .unwrap();
    assert_eq!(report, json!({"diffs": []}));
}

#[test]
fn test_entry_without_postings_is_still_emitted() {
    let catalog = terms_catalog(ColumnFlags::empty());
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![], vec![]), (2, vec![5], vec![])]);

    let mut writer = JsonTreeWriter::new();
    let summary = DiffReportBuilder::new(lexicon.as_ref(), ColumnFlags::empty())
        .build(&diff, &mut writer)
        .unwrap();

    assert_eq!(summary.n_entries, 2);
    assert_eq!(
        writer.finish().unwrap(),
        json!({"diffs": [
            {"token": {"id": 1, "value": "hello"}, "remains": [], "missings": []},
            {"token": {"id": 2, "value": "world"}, "remains": [{"record_id": 5}], "missings": []}
        ]})
    );
}

#[test]
fn test_entries_keep_input_order_and_count() {
    let catalog = terms_catalog(ColumnFlags::WITH_POSITION);
    let lexicon = terms(&catalog);
    let diff = diff(vec![
        (3, vec![1, 0], vec![]),
        (1, vec![], vec![2, 9]),
        (2, vec![4, 4], vec![5, 5]),
    ]);

    let report = build_report(&diff, lexicon.as_ref(), ColumnFlags::WITH_POSITION).unwrap();
    let ids: Vec<u64> = report["diffs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["token"]["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_posting_field_sets_follow_flags() {
    let cases = [
        (ColumnFlags::empty(), vec!["record_id"]),
        (ColumnFlags::WITH_SECTION, vec!["record_id", "section_id"]),
        (ColumnFlags::WITH_POSITION, vec!["position", "record_id"]),
        (
            ColumnFlags::WITH_SECTION | ColumnFlags::WITH_POSITION,
            vec!["position", "record_id", "section_id"],
        ),
    ];

    for (flags, expected) in cases {
        let catalog = terms_catalog(flags);
        let lexicon = terms(&catalog);
        let width = expected.len() as u32;
        let vector: Vec<u32> = (1..=width * 2).collect();
        let diff = diff(vec![(1, vector.clone(), vector)]);

        let report = build_report(&diff, lexicon.as_ref(), flags).unwrap();
        for side in ["remains", "missings"] {
            for posting in report["diffs"][0][side].as_array().unwrap() {
                let mut keys: Vec<&str> = posting
                    .as_object()
                    .unwrap()
                    .keys()
                    .map(String::as_str)
                    .collect();
                keys.sort_unstable();
                assert_eq!(keys, expected, "flags {:?} side {}", flags, side);
            }
        }
    }
}

#[test]
fn test_misaligned_vector_aborts_build() {
    let catalog = terms_catalog(ColumnFlags::WITH_SECTION | ColumnFlags::WITH_POSITION);
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![10, 1, 5], vec![]), (2, vec![], vec![1, 2, 3, 4])]);

    let err = build_report(
        &diff,
        lexicon.as_ref(),
        ColumnFlags::WITH_SECTION | ColumnFlags::WITH_POSITION,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::DecodeFailed);
    assert_eq!(err.table(), Some("Terms"));
    assert_eq!(err.token_id(), Some(2));
}

#[test]
fn test_missing_key_aborts_by_default() {
    let mut catalog = terms_catalog(ColumnFlags::empty());
    catalog.remove_key("Terms", 2).unwrap();
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![1], vec![]), (2, vec![2], vec![])]);

    let err = build_report(&diff, lexicon.as_ref(), ColumnFlags::empty()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::KeyLookupFailed);
    assert_eq!(err.token_id(), Some(2));
}

#[test]
fn test_missing_key_marked_unresolved_keeps_entry() {
    let mut catalog = terms_catalog(ColumnFlags::empty());
    catalog.remove_key("Terms", 2).unwrap();
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![1], vec![]), (2, vec![2], vec![3])]);

    let mut builder = DiffReportBuilder::new(lexicon.as_ref(), ColumnFlags::empty())
        .with_missing_key_policy(MissingKeyPolicy::MarkUnresolved);
    let mut writer = JsonTreeWriter::new();
    let summary = builder.build(&diff, &mut writer).unwrap();
    let report = writer.finish().unwrap();

    assert_eq!(summary.n_entries, 2);
    assert_eq!(summary.n_unresolved, 1);
    assert_eq!(
        report["diffs"][1],
        json!({
            "token": {"id": 2, "value": null},
            "remains": [{"record_id": 2}],
            "missings": [{"record_id": 3}]
        })
    );
}

#[test]
fn test_key_too_large_is_fatal_even_when_marking_unresolved() {
    let mut catalog = terms_catalog(ColumnFlags::empty());
    catalog.set_max_key_size("Terms", 4).unwrap();
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![1], vec![])]);

    let mut builder = DiffReportBuilder::new(lexicon.as_ref(), ColumnFlags::empty())
        .with_missing_key_policy(MissingKeyPolicy::MarkUnresolved);
    let err = builder
        .build(&diff, &mut JsonTreeWriter::new())
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::KeyTooLarge);
}

#[test]
fn test_non_text_keys_render_by_type() {
    let mut catalog = MemoryCatalog::new();
    catalog.add_lexicon("Ids", KeyType::Int32).unwrap();
    catalog
        .insert_key("Ids", 1, &(-5i32).to_le_bytes())
        .unwrap();
    catalog.add_lexicon("Blobs", KeyType::Binary).unwrap();
    catalog.insert_key("Blobs", 1, &[0xde, 0xad]).unwrap();
    let diff = diff(vec![(1, vec![1], vec![])]);

    let ids = catalog.find_table("Ids").unwrap().unwrap();
    let report = build_report(
        &diff,
        catalog.open_lexicon(&ids).unwrap().as_ref(),
        ColumnFlags::empty(),
    )
    .unwrap();
    assert_eq!(report["diffs"][0]["token"]["value"], json!(-5));

    let blobs = catalog.find_table("Blobs").unwrap().unwrap();
    let report = build_report(
        &diff,
        catalog.open_lexicon(&blobs).unwrap().as_ref(),
        ColumnFlags::empty(),
    )
    .unwrap();
    assert_eq!(report["diffs"][0]["token"]["value"], json!("3q0="));
}

#[test]
fn test_stream_writer_emits_same_report() {
    let flags = ColumnFlags::WITH_SECTION;
    let catalog = terms_catalog(flags);
    let lexicon = terms(&catalog);
    let diff = diff(vec![(1, vec![1, 1, 2, 1], vec![]), (3, vec![], vec![9, 2])]);

    let mut stream = JsonStreamWriter::new(Vec::new());
    let summary = DiffReportBuilder::new(lexicon.as_ref(), flags)
        .build(&diff, &mut stream)
        .unwrap();
    let streamed: Value = serde_json::from_slice(&stream.finish().unwrap()).unwrap();

    assert_eq!(
        streamed,
        build_report(&diff, lexicon.as_ref(), flags).unwrap()
    );
    assert_eq!(
        (summary.n_entries, summary.n_remains, summary.n_missings),
        (2, 2, 1)
    );
}
