use postdiff_core::errors::PostDiffError;
use postdiff_core::posting::{decode, decode_into, encode, posting_count, Posting, PostingShape};
use proptest::prelude::*;

fn shape_strategy() -> impl Strategy<Value = PostingShape> {
    prop::sample::select(PostingShape::ALL.to_vec())
}

fn postings_strategy(shape: PostingShape) -> impl Strategy<Value = Vec<Posting>> {
    prop::collection::vec((any::<u32>(), any::<u32>(), any::<u32>()), 0..32).prop_map(
        move |tuples| {
            tuples
                .into_iter()
                .map(|(record_id, section_id, position)| {
                    let mut posting = Posting::new(record_id);
                    if shape.has_section() {
                        posting = posting.with_section(section_id);
                    }
                    if shape.has_position() {
                        posting = posting.with_position(position);
                    }
                    posting
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn prop_encode_then_decode_is_identity(
        (shape, postings) in shape_strategy().prop_flat_map(|s| (Just(s), postings_strategy(s)))
    ) {
        let vector = encode(&postings, shape).unwrap();
        prop_assert_eq!(vector.len(), postings.len() * shape.width());
        prop_assert_eq!(decode(&vector, shape).unwrap(), postings);
    }

    #[test]
    fn prop_decoded_length_is_vector_length_over_width(
        shape in shape_strategy(),
        n in 0usize..64,
    ) {
        let vector: Vec<u32> = (0..(n * shape.width()) as u32).collect();
        let postings = decode(&vector, shape).unwrap();
        prop_assert_eq!(postings.len(), vector.len() / shape.width());
        prop_assert!(postings.iter().all(|p| p.n_fields() == shape.width()));
    }

    #[test]
    fn prop_misaligned_vector_is_rejected(
        shape in shape_strategy().prop_filter("needs width > 1", |s| s.width() > 1),
        n in 0usize..32,
        extra in 1usize..3,
    ) {
        let extra = extra % shape.width();
        prop_assume!(extra != 0);
        let vector = vec![7u32; n * shape.width() + extra];

        let err = decode(&vector, shape).unwrap_err();
        prop_assert_eq!(
            err,
            PostDiffError::MisalignedPostingVector {
                len: vector.len(),
                width: shape.width(),
            }
        );
        prop_assert!(posting_count(vector.len(), shape).is_err());
    }
}

#[test]
fn test_section_and_position_scenario() {
    let postings = decode(&[10, 1, 5, 20, 2, 7], PostingShape::WithSectionAndPosition).unwrap();
    assert_eq!(
        postings,
        vec![
            Posting::new(10).with_section(1).with_position(5),
            Posting::new(20).with_section(2).with_position(7),
        ]
    );
}

#[test]
fn test_record_only_scenario() {
    let postings = decode(&[3, 4], PostingShape::RecordOnly).unwrap();
    assert_eq!(postings, vec![Posting::new(3), Posting::new(4)]);
}

#[test]
fn test_decode_into_leaves_buffer_empty_on_error() {
    let mut buffer = vec![Posting::new(1)];
    assert!(decode_into(&[1, 2, 3], PostingShape::WithPosition, &mut buffer).is_err());
    assert!(buffer.is_empty());
}

#[test]
fn test_encode_rejects_posting_of_other_shape() {
    let err = encode(&[Posting::new(1).with_section(2)], PostingShape::RecordOnly).unwrap_err();
    assert!(matches!(err, PostDiffError::PostingShapeMismatch { index: 0, .. }));
}
