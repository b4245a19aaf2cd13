use jumprope::JumpRope;
use rand::prelude::*;

use editlog::*;

const UCHARS: [char; 20] = [
    'a', 'b', 'c', '1', '2', '3', ' ', '\n', // ASCII
    '©', '¥', '½', // The Latin-1 suppliment (U+80 - U+ff)
    'Ύ', 'Δ', 'δ', // Greek (U+0370 - U+03FF)
    '←', '↯', '↻', // Arrows (U+2190 – U+21FF)
    '𐆐', '𐆔', '𐆘', // Ancient roman symbols (U+10190 – U+101CF)
];

fn random_str(len: usize, rng: &mut SmallRng) -> String {
    (0..len).map(|_| UCHARS[rng.gen_range(0..UCHARS.len())]).collect()
}

fn make_random_op(doc: &str, rng: &mut SmallRng) -> Operation {
    let chars: Vec<char> = doc.chars().collect();
    let mut b = OperationBuilder::new();
    let mut i = 0;

    while i < chars.len() {
        let n = rng.gen_range(1..=usize::min(8, chars.len() - i));
        let text: String = chars[i..i + n].iter().collect();
        match rng.gen_range(0..10) {
            0..=5 => b.retain(n),
            6 | 7 => b.delete(&text),
            8 => {
                b.insert(&random_str(rng.gen_range(1..4), rng));
                continue;
            }
            _ => b.replace(&text, &random_str(rng.gen_range(0..4), rng)),
        }
        i += n;
    }
    if rng.gen_bool(0.3) {
        b.insert(&random_str(rng.gen_range(1..4), rng));
    }

    b.build_sized(chars.len())
}

fn random_sticky(rng: &mut SmallRng) -> Sticky {
    if rng.gen_bool(0.5) { Sticky::Left } else { Sticky::Right }
}

/// Spread the ops out over more ops, in a layout which normalizes back to `op`.
fn relayout(op: &Operation, rng: &mut SmallRng) -> Operation {
    let mut ops = vec![];
    for o in op.ops() {
        match o {
            Op::Retain(n) => {
                let k = rng.gen_range(0..=*n);
                ops.extend([Op::Retain(k), Op::Retain(0), Op::Retain(n - k)]);
            }
            Op::Replace { delete, insert } => {
                let del: Vec<char> = delete.chars().collect();
                let ins: Vec<char> = insert.chars().collect();
                let (d, i) = (rng.gen_range(0..=del.len()), rng.gen_range(0..=ins.len()));
                let d1: String = del[..d].iter().collect();
                let i1: String = ins[..i].iter().collect();
                let tail = Op::replace(&del[d..].iter().collect::<String>(), &ins[i..].iter().collect::<String>());
                if rng.gen_bool(0.5) {
                    ops.extend([Op::insert(&i1), Op::delete(&d1), tail]);
                } else {
                    ops.extend([Op::delete(&d1), Op::insert(&i1), tail]);
                }
            }
        }
    }
    Operation::from_ops(ops)
}

/// Is `offset` strictly inside text deleted by `op`?
fn inside_delete(op: &Operation, offset: usize) -> bool {
    let mut pos = 0;
    op.ops().any(|o| {
        let start = pos;
        pos += o.len_before();
        !o.is_retain() && start < offset && offset < pos
    })
}

fn apply(op: &Operation, doc: &str) -> String {
    let result = op.apply_to_string(doc).unwrap();

    let mut rope = JumpRope::from(doc);
    op.apply_to_rope(&mut rope).unwrap();
    assert_eq!(rope.to_string(), result);

    result
}

fn check_compose(doc: &str, rng: &mut SmallRng) {
    let a = make_random_op(doc, rng);
    let mid = apply(&a, doc);
    let b = make_random_op(&mid, rng);
    let end = apply(&b, &mid);

    let ab = a.compose(&b);
    assert_eq!(ab.len_before(), a.len_before());
    assert_eq!(ab.len_after(), b.len_after());
    assert_eq!(apply(&ab, doc), end);

    let c = make_random_op(&end, rng);
    let left = ab.compose(&c);
    let right = a.compose(&b.compose(&c));
    assert_eq!(apply(&left, doc), apply(&right, doc));

    // Undo.
    assert_eq!(apply(&a.invert(), &mid), doc);
    assert!(a.compose(&a.invert()).is_identity());
}

fn check_transform(doc: &str, rng: &mut SmallRng) {
    let a = make_random_op(doc, rng);
    let b = make_random_op(doc, rng);

    let b2 = b.transform(&a, Sticky::Right);
    let a2 = a.transform(&b, Sticky::Left);
    assert_eq!(b2.len_before(), a.len_after());
    assert_eq!(a2.len_before(), b.len_after());

    let left = apply(&a.compose(&b2), doc);
    let right = apply(&b.compose(&a2), doc);
    assert_eq!(left, right);
    assert_eq!(a.compose(&b2), b.compose(&a2));
    assert_eq!(apply(&a.plus(&b), doc), left);
}

fn check_deduce(doc: &str, rng: &mut SmallRng) {
    let op = make_random_op(doc, rng);
    let after = apply(&op, doc);

    let deduced = deduce(doc, &after);
    assert_eq!(apply(&deduced, doc), after);
    assert_eq!(apply(&deduce_fast(doc, &after), doc), after);
    assert!(deduce(doc, doc).is_identity());

    let cfg = DiffConfig { sequent_min: rng.gen_range(1..6), distance_max: rng.gen_range(0..12), stride: rng.gen_range(1..12) };
    assert_eq!(apply(&deduce_with(doc, &after, &cfg), doc), after);
}

fn check_normalize(doc: &str, rng: &mut SmallRng) {
    let op = make_random_op(doc, rng);
    // Split every op up so there's something to normalize.
    let split: Vec<Op> = op.ops().flat_map(|o| match o {
        Op::Retain(n) if *n > 1 => vec![Op::Retain(1), Op::Retain(0), Op::Retain(n - 1)],
        o => vec![o.clone(), Op::insert("")],
    }).collect();
    let split = Operation::from_ops(split);

    let soft = split.normalize_soft();
    assert_eq!(soft.normalize_soft(), soft);
    assert_eq!(soft, op.normalize_soft());
    // The only op allowed to be empty is the retain in a length-0 identity.
    assert!(soft == Operation::identity(0) || soft.ops().all(|o| !o.is_noop()));
    assert_eq!(apply(&soft, doc), apply(&op, doc));

    let hard = split.normalize_hard();
    assert_eq!(apply(&hard, doc), apply(&op, doc));
}

fn check_points(doc: &str, rng: &mut SmallRng) {
    let op = make_random_op(doc, rng);
    let len = op.len_before();

    for sticky in [Sticky::Left, Sticky::Right] {
        let mut last = 0;
        for offset in 0..=len {
            let new = op.transform_offset(offset, sticky);
            assert!(new <= op.len_after());
            assert!(new >= last);
            last = new;
        }
    }

    let start = rng.gen_range(0..=len);
    let end = rng.gen_range(start..=len);
    let range = op.transform_range(start..end, None);
    assert!(range.start <= range.end);
    assert!(range.end <= op.len_after());

    // Offsets in untouched text map through unchanged text.
    let after = apply(&op, doc);
    let doc_chars: Vec<char> = doc.chars().collect();
    let after_chars: Vec<char> = after.chars().collect();
    let mut pos = 0;
    for o in op.ops() {
        if let Op::Retain(n) = o {
            for offset in pos..pos + n {
                let new = op.transform_offset(offset, Sticky::Right);
                assert_eq!(doc_chars[offset], after_chars[new]);
            }
        }
        pos += o.len_before();
    }

    // A caret moves where concurrently typed text would go.
    for offset in 0..=len {
        if inside_delete(&op, offset) { continue; }
        for sticky in [Sticky::Left, Sticky::Right] {
            let typed = Operation::insert_at(offset, "Q", len).transform(&op, sticky);
            let typed_at = typed.affected_ranges().next().unwrap().start;
            assert_eq!(op.transform_offset(offset, sticky), typed_at);
        }
    }

    // Ops which normalize to the same thing move points the same way.
    let spread = relayout(&op, rng);
    assert_eq!(spread.normalize_soft(), op.normalize_soft());
    for offset in 0..=len {
        for sticky in [Sticky::Left, Sticky::Right] {
            assert_eq!(spread.transform_offset(offset, sticky), op.transform_offset(offset, sticky));
        }
    }
}

fn check_ranges(doc: &str, rng: &mut SmallRng) {
    let op = make_random_op(doc, rng);
    let len = op.len_before();

    let mut points = vec![];
    for key in 0..4 {
        let start = rng.gen_range(0..=len);
        let end = rng.gen_range(start..=len);
        points.push(IntervalPoint::start(start, random_sticky(rng), key, ()));
        points.push(IntervalPoint::end(end, random_sticky(rng), key, ()));
    }
    // Ends are often listed before their starts.
    points.shuffle(rng);
    let keys: Vec<usize> = points.iter().map(|p| p.key).collect();

    let shifted = shift_points(&op, points, random_sticky(rng));
    assert_eq!(shifted.iter().map(|p| p.key).collect::<Vec<_>>(), keys);
    for key in 0..4 {
        let offset_of = |kind: BorderKind| shifted.iter()
            .find(|p| p.key == key && p.border() == Some(kind))
            .map(|p| p.offset)
            .unwrap();
        let (start, end) = (offset_of(BorderKind::Start), offset_of(BorderKind::End));
        assert!(start <= end, "range {key} inverted: {start} > {end} after {op}");
        assert!(end <= op.len_after());
    }
}

fn check_split(doc: &str, rng: &mut SmallRng) {
    let op = make_random_op(doc, rng);
    let len = op.len_before();
    let mid = rng.gen_range(0..=len);
    let parts = op.split_edits_by_ranges(&[0..mid, mid..len]);

    for part in &parts {
        assert_eq!(part.len_before(), len);
        apply(part, doc);
    }

    // A replace touching neither range can't exist, so every replace ends up somewhere.
    let replaces = op.affected_ranges().count();
    let found = parts.iter().map(|p| p.affected_ranges().count()).sum::<usize>();
    assert!(found >= replaces);

    assert_eq!(Operation::compose_all(&parts[..1]), parts[0].normalize_soft());
}

#[test]
fn fuzz_algebra() {
    for seed in 0..300 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let len = rng.gen_range(0..40);
        let doc = random_str(len, &mut rng);

        check_compose(&doc, &mut rng);
        check_transform(&doc, &mut rng);
        check_deduce(&doc, &mut rng);
        check_normalize(&doc, &mut rng);
        check_points(&doc, &mut rng);
        check_ranges(&doc, &mut rng);
        check_split(&doc, &mut rng);
    }
}

#[test]
fn fuzz_long_documents() {
    let mut rng = SmallRng::seed_from_u64(321);
    let mut doc = random_str(2000, &mut rng);

    for _ in 0..50 {
        let a = make_random_op(&doc, &mut rng);
        let b = make_random_op(&doc, &mut rng);
        let merged = a.plus(&b);
        let other_way = b.compose(&a.transform(&b, Sticky::Left));
        let result = apply(&merged, &doc);
        assert_eq!(apply(&other_way, &doc), result);
        doc = result;
    }
}
