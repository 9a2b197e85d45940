use rstest::rstest;
use ujdom::{unpack, unpack_format, ErrorKind, Expected, Field, Session, TypeCode};

const PERSON: &[u8] =
    br#"{"name": "John Doe", "age": 31, "number": 1337.0, "address": { "city": "Uppsala"} }"#;

#[rstest]
fn unpack_person_and_nested_address() {
    let session = Session::new();
    let person = session.decode(PERSON).unwrap();

    let mut slots = [None; 4];
    let found = unpack_format(person, &["name", "age", "number", "address"], "SNNO", &mut slots)
        .unwrap();
    assert_eq!(found, 4);

    let [name, age, number, address] = slots.map(Option::unwrap);
    assert_eq!(name.read_string(), "John Doe");
    assert_eq!(age.numeric_as_i32(), 31);
    assert_eq!(number.numeric_as_f64(), 1337.0);
    assert!(address.is_object());

    let mut city = [None];
    assert_eq!(unpack_format(address, &["city"], "S", &mut city).unwrap(), 1);
    assert_eq!(city[0].unwrap().read_string(), "Uppsala");
}

#[rstest]
fn type_mismatch_is_not_counted_and_slot_untouched() {
    let session = Session::new();
    let person = session.decode(PERSON).unwrap();
    let sentinel = session.decode(b"\"untouched\"").unwrap();

    let mut fields = [
        Field::new("name", TypeCode::required(Expected::Numeric)),
        Field::new("age", TypeCode::required(Expected::Numeric)),
    ];
    fields[0].slot = Some(sentinel);

    assert_eq!(unpack(person, &mut fields).unwrap(), 1);
    assert!(std::ptr::eq(fields[0].slot.unwrap(), sentinel));
    assert_eq!(fields[1].slot.unwrap().int32(), Some(31));
}

#[rstest]
#[case('b', true)]
#[case('B', false)]
#[case('n', true)]
#[case('N', false)]
#[case('s', true)]
#[case('S', false)]
#[case('a', true)]
#[case('A', false)]
#[case('o', true)]
#[case('O', false)]
#[case('u', true)]
#[case('U', true)]
fn null_matches_only_nullable_codes(#[case] code: char, #[case] matched: bool) {
    let session = Session::new();
    let root = session.decode(br#"{"value": null}"#).unwrap();
    let mut slots = [None];
    let found = unpack_format(root, &["value"], &code.to_string(), &mut slots).unwrap();
    assert_eq!(found, usize::from(matched));
    assert_eq!(slots[0].is_some(), matched);
    if matched {
        assert!(slots[0].unwrap().is_null());
    }
}

#[rstest]
#[case("B", r#"true"#, true)]
#[case("B", r#"0"#, false)]
#[case("N", r#"5000000000"#, true)]
#[case("N", r#"2.5"#, true)]
#[case("N", r#""2.5""#, false)]
#[case("S", r#""x""#, true)]
#[case("A", r#"[1]"#, true)]
#[case("A", r#"{}"#, false)]
#[case("O", r#"{}"#, true)]
#[case("O", r#"[]"#, false)]
#[case("U", r#"[]"#, true)]
fn type_codes_check_value_kind(#[case] format: &str, #[case] value: &str, #[case] matched: bool) {
    let session = Session::new();
    let input = format!(r#"{{"k": {value}}}"#);
    let root = session.decode(input.as_bytes()).unwrap();
    let mut slots = [None];
    let found = unpack_format(root, &["k"], format, &mut slots).unwrap();
    assert_eq!(found == 1, matched);
}

#[rstest]
fn first_duplicate_wins() {
    let session = Session::new();
    let root = session.decode(br#"{"id": 1, "id": 2}"#).unwrap();
    let mut slots = [None];
    assert_eq!(unpack_format(root, &["id"], "N", &mut slots).unwrap(), 1);
    assert_eq!(slots[0].unwrap().int32(), Some(1));
}

#[rstest]
fn later_duplicate_matches_after_type_mismatch() {
    let session = Session::new();
    let root = session.decode(br#"{"id": "one", "id": 2}"#).unwrap();
    let mut slots = [None];
    assert_eq!(unpack_format(root, &["id"], "N", &mut slots).unwrap(), 1);
    assert_eq!(slots[0].unwrap().int32(), Some(2));
}

#[rstest]
fn missing_keys_are_left_empty() {
    let session = Session::new();
    let root = session.decode(br#"{"a": 1, "extra": true}"#).unwrap();
    let mut slots = [None; 3];
    assert_eq!(unpack_format(root, &["a", "b", "c"], "Nbu", &mut slots).unwrap(), 1);
    assert!(slots[0].is_some());
    assert!(slots[1].is_none() && slots[2].is_none());
}

#[rstest]
#[case(b"[1, 2]".as_slice())]
#[case(b"\"object\"".as_slice())]
#[case(b"null".as_slice())]
fn non_object_target_is_rejected_without_writes(#[case] input: &[u8]) {
    let session = Session::new();
    let root = session.decode(input).unwrap();
    let mut fields = [Field::new("a", TypeCode::required(Expected::Any))];
    let err = root.unpack(&mut fields).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unpack);
    assert!(fields[0].slot.is_none());
}

#[rstest]
fn invalid_format_is_rejected() {
    let session = Session::new();
    let root = session.decode(br#"{"a": 1}"#).unwrap();
    let mut slots = [None];
    let err = unpack_format(root, &["a"], "X", &mut slots).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Format);
    assert!(slots[0].is_none());
}
