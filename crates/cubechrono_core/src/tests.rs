use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::*;

#[test]
fn test_generate_three() {
    let batch = generate(ScrambleKind::Three, 1).unwrap();
    assert_eq!(batch.kind, ScrambleKind::Three);
    assert_eq!(batch.len(), 1);
    let scramble = &batch.scrambles[0];
    assert_eq!(scramble.kind, ScrambleKind::Three);
    assert_eq!(scramble.sequence().split(' ').count(), SCRAMBLE_LENGTH);
    scramble.validate().unwrap();

    let batch = generate("Three".into(), 3).unwrap();
    assert_eq!(batch.len(), 3);
    for scramble in &batch.scrambles {
        scramble.validate().unwrap();
    }
}

#[test]
fn test_generate_rejects_nonpositive_count() {
    for count in [0, -1, i64::MIN] {
        assert!(matches!(
            generate(ScrambleKind::Three, count),
            Err(ScrambleError::InvalidArgument(_)),
        ));
    }
}

#[test]
fn test_unknown_kind_passes_through() {
    let kind = ScrambleKind::from("Megaminx");
    assert_eq!(kind, ScrambleKind::Other("Megaminx".to_owned()));
    let batch = generate_seeded(kind.clone(), 2, 7).unwrap();
    assert_eq!(batch.kind, kind);
    assert!(batch.scrambles.iter().all(|s| s.kind == kind));
}

#[test]
fn test_seeded_generation_is_deterministic() {
    let a = generate_seeded(ScrambleKind::Three, 5, 12345).unwrap();
    let b = generate_seeded(ScrambleKind::Three, 5, 12345).unwrap();
    let c = generate_seeded(ScrambleKind::Three, 5, 54321).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);

    let request = ScrambleRequest {
        seed: Some(12345),
        ..ScrambleRequest::new(ScrambleKind::Three, 5)
    };
    assert_eq!(request.generate().unwrap(), a);
}

#[test]
fn test_scramble_json() {
    let scramble = Scramble::from_sequence(ScrambleKind::Three, "R U2 F' D L2").unwrap();
    let json = serde_json::to_string(&scramble).unwrap();
    assert_eq!(json, r#"{"kind":"Three","sequence":"R U2 F' D L2"}"#);
    assert_eq!(serde_json::from_str::<Scramble>(&json).unwrap(), scramble);

    serde_json::from_str::<Scramble>(r#"{"kind":"Three","sequence":"R Q"}"#)
        .expect_err("unknown face");
}

#[test]
fn test_validate_scramble() {
    let short = Scramble::from_sequence(ScrambleKind::Three, "R U").unwrap();
    assert_eq!(
        short.validate(),
        Err(InvalidScramble::WrongLength {
            expected: SCRAMBLE_LENGTH,
            actual: 2,
        }),
    );

    let repeated = "R U F D L B R R' U F D L B R U F D L B R";
    let repeated = Scramble::from_sequence(ScrambleKind::Three, repeated).unwrap();
    assert_eq!(
        repeated.validate(),
        Err(InvalidScramble::RepeatedFace {
            index: 6,
            face: Face::R,
        }),
    );
}

#[test]
fn test_every_face_and_modifier_appears() {
    let batch = generate_seeded(ScrambleKind::Three, 50, 0).unwrap();
    let turns: Vec<Turn> = batch
        .scrambles
        .iter()
        .flat_map(|s| s.turns().iter().copied())
        .collect();
    for face in [Face::U, Face::D, Face::L, Face::R, Face::F, Face::B] {
        assert!(turns.iter().any(|t| t.face == face), "missing {face}");
    }
    for modifier in [Modifier::Identity, Modifier::Inverse, Modifier::Double] {
        assert!(turns.iter().any(|t| t.modifier == modifier));
    }
}

proptest! {
    #[test]
    fn proptest_scramble_invariants(seed: u64, count in 1..=20_i64) {
        let batch = generate_seeded(ScrambleKind::Three, count, seed).unwrap();
        prop_assert_eq!(batch.len() as i64, count);
        for scramble in &batch.scrambles {
            prop_assert_eq!(scramble.turns().len(), SCRAMBLE_LENGTH);
            for pair in scramble.turns().windows(2) {
                prop_assert_ne!(pair[0].face, pair[1].face);
            }
        }
    }

    #[test]
    fn proptest_sequence_text(seed: u64) {
        let batch = generate_seeded(ScrambleKind::Three, 1, seed).unwrap();
        let sequence = batch.scrambles[0].sequence();
        for token in sequence.split(' ') {
            let (face, suffix) = token.split_at(1);
            prop_assert!(["U", "D", "L", "R", "F", "B"].contains(&face));
            prop_assert!(["", "'", "2"].contains(&suffix));
        }
        let reparsed = Scramble::from_sequence(ScrambleKind::Three, &sequence).unwrap();
        prop_assert_eq!(&reparsed, &batch.scrambles[0]);
    }

    #[test]
    fn proptest_nonpositive_count_fails(count in i64::MIN..=0) {
        prop_assert!(generate_seeded(ScrambleKind::Three, count, 0).is_err());
    }
}
