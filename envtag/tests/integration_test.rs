//! Integration tests

use envtag::{BindError, Binder, Bound, FieldError, Policy, Record, SignedDuration};
use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use std::time::Duration;

fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn bind_from<R: Record>(record: &mut R, pairs: &[(&str, &str)]) -> Result<(), BindError> {
    Binder::new().with_source(source(pairs)).bind(record)
}

fn field_errors(error: BindError) -> Vec<FieldError> {
    match error {
        BindError::Fields(errors) => errors.into_iter().collect(),
        other => panic!("expected field errors, got {other:?}"),
    }
}

#[derive(Debug, Default, Record)]
struct Scalars {
    #[env("S_STRING")]
    string: String,
    #[env("S_I8")]
    i8: i8,
    #[env("S_I16")]
    i16: i16,
    #[env("S_I32")]
    i32: i32,
    #[env("S_I64")]
    i64: i64,
    #[env("S_ISIZE")]
    isize: isize,
    #[env("S_U8")]
    u8: u8,
    #[env("S_U16")]
    u16: u16,
    #[env("S_U32")]
    u32: u32,
    #[env("S_U64")]
    u64: u64,
    #[env("S_USIZE")]
    usize: usize,
    #[env("S_BOOL")]
    bool: bool,
    #[env("S_F32")]
    f32: f32,
    #[env("S_F64")]
    f64: f64,
    #[env("S_DURATION")]
    duration: Duration,
}

#[test]
fn test_scalar_values_round_trip() {
    let mut scalars = Scalars::default();
    bind_from(
        &mut scalars,
        &[
            ("S_STRING", "hello world"),
            ("S_I8", "-128"),
            ("S_I16", "-300"),
            ("S_I32", "70000"),
            ("S_I64", "-9223372036854775808"),
            ("S_ISIZE", "-1"),
            ("S_U8", "255"),
            ("S_U16", "65535"),
            ("S_U32", "4294967295"),
            ("S_U64", "18446744073709551615"),
            ("S_USIZE", "42"),
            ("S_BOOL", "True"),
            ("S_F32", "143.123"),
            ("S_F64", "-18.9e3"),
            ("S_DURATION", "1m30s"),
        ],
    )
    .unwrap();

    assert_eq!(scalars.string, "hello world");
    assert_eq!(scalars.i8, i8::MIN);
    assert_eq!(scalars.i16, -300);
    assert_eq!(scalars.i32, 70000);
    assert_eq!(scalars.i64, i64::MIN);
    assert_eq!(scalars.isize, -1);
    assert_eq!(scalars.u8, u8::MAX);
    assert_eq!(scalars.u16, u16::MAX);
    assert_eq!(scalars.u32, u32::MAX);
    assert_eq!(scalars.u64, u64::MAX);
    assert_eq!(scalars.usize, 42);
    assert!(scalars.bool);
    assert_eq!(scalars.f32, 143.123);
    assert_eq!(scalars.f64, -18900.0);
    assert_eq!(scalars.duration, Duration::from_secs(90));
}

#[test]
fn test_unset_scalars_keep_their_values() {
    let mut scalars = Scalars {
        string: "kept?".to_string(),
        u16: 7,
        bool: true,
        duration: Duration::from_secs(1),
        ..Scalars::default()
    };
    bind_from(&mut scalars, &[]).unwrap();

    // Strings are always written, even with the empty string.
    assert_eq!(scalars.string, "");
    assert_eq!(scalars.u16, 7);
    assert!(scalars.bool);
    assert_eq!(scalars.duration, Duration::from_secs(1));
}

#[test]
fn test_conversion_failure_names_field_and_type() {
    let mut scalars = Scalars::default();
    let errors = field_errors(bind_from(&mut scalars, &[("S_U8", "256"), ("S_BOOL", "yes")]).unwrap_err());

    assert_eq!(errors.len(), 2);
    match &errors[0] {
        FieldError::ConversionFailed {
            field,
            key,
            raw,
            target,
            ..
        } => {
            assert_eq!(field, "u8");
            assert_eq!(key, "S_U8");
            assert_eq!(raw, "256");
            assert_eq!(*target, "u8");
        }
        other => panic!("expected ConversionFailed, got {other:?}"),
    }
    assert!(matches!(&errors[1], FieldError::ConversionFailed { raw, .. } if raw == "yes"));
}

#[derive(Debug, Default, Record)]
struct Required {
    #[env("R_NAME,required")]
    name: String,

    #[env("R_PORT,required,defVal:8080")]
    port: u16,
}

#[test]
fn test_missing_required_field() {
    let mut required = Required::default();
    let errors = field_errors(bind_from(&mut required, &[]).unwrap_err());

    assert_eq!(
        errors,
        [FieldError::MissingRequired {
            key: "R_NAME".to_string()
        }]
    );
    assert_eq!(required.name, "");
    assert_eq!(required.port, 8080);
}

#[test]
fn test_required_satisfied_by_empty_value() {
    let mut required = Required::default();
    bind_from(&mut required, &[("R_NAME", "")]).unwrap();
    assert_eq!(required.name, "");
}

#[derive(Debug, Default, Record)]
struct Bounded {
    #[env("B_WORKERS,defVal:4,min:1,max:16")]
    workers: u32,

    #[env("B_RATIO,min:0.5,max:1")]
    ratio: f64,

    #[env("B_NAME,min:3,max:8")]
    name: String,

    #[env("B_TIMEOUT,defVal:4s,min:1s,max:1m")]
    timeout: Duration,
}

#[test]
fn test_values_within_bounds() {
    let mut bounded = Bounded::default();
    bind_from(
        &mut bounded,
        &[("B_WORKERS", "16"), ("B_RATIO", "0.5"), ("B_NAME", "envtag")],
    )
    .unwrap();

    assert_eq!(bounded.workers, 16);
    assert_eq!(bounded.ratio, 0.5);
    assert_eq!(bounded.name, "envtag");
    assert_eq!(bounded.timeout, Duration::from_secs(4));
}

#[test]
fn test_values_out_of_bounds() {
    let mut bounded = Bounded {
        workers: 2,
        name: "previous".to_string(),
        ..Bounded::default()
    };
    let errors = field_errors(
        bind_from(
            &mut bounded,
            &[
                ("B_WORKERS", "0"),
                ("B_RATIO", "1.5"),
                ("B_NAME", "ab"),
                ("B_TIMEOUT", "500ms"),
            ],
        )
        .unwrap_err(),
    );

    let violations: Vec<_> = errors
        .iter()
        .map(|error| match error {
            FieldError::OutOfRange {
                field,
                bound,
                bound_value,
                ..
            } => (field.as_str(), *bound, bound_value.as_str()),
            other => panic!("expected OutOfRange, got {other:?}"),
        })
        .collect();
    assert_eq!(
        violations,
        [
            ("workers", Bound::Min, "1"),
            ("ratio", Bound::Max, "1"),
            ("name", Bound::Min, "3"),
            ("timeout", Bound::Min, "1s"),
        ]
    );

    // Failed fields keep their previous values.
    assert_eq!(bounded.workers, 2);
    assert_eq!(bounded.ratio, 0.0);
    assert_eq!(bounded.name, "previous");
    assert_eq!(bounded.timeout, Duration::ZERO);
}

#[derive(Debug, Default, Record)]
struct Offsets {
    #[env("O_OFFSET")]
    offset: SignedDuration,

    #[env("O_WINDOW,min:-1s")]
    window: SignedDuration,

    #[env("O_DRIFT,defVal:-1h30m,min:-2h,max:0s")]
    drift: SignedDuration,

    #[env("O_TIMEOUT")]
    timeout: Duration,
}

#[test]
fn test_negative_durations() {
    let mut offsets = Offsets::default();
    let errors = field_errors(
        bind_from(
            &mut offsets,
            &[("O_OFFSET", "-5s"), ("O_WINDOW", "2s"), ("O_TIMEOUT", "-5s")],
        )
        .unwrap_err(),
    );

    assert_eq!(offsets.offset, SignedDuration::from_secs(-5));
    assert_eq!(offsets.window, SignedDuration::from_secs(2));
    assert_eq!(offsets.drift, SignedDuration::from_secs(-5400));

    // Unsigned durations still refuse a sign.
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        FieldError::ConversionFailed { field, raw, .. } if field == "timeout" && raw == "-5s"
    ));
    assert_eq!(offsets.timeout, Duration::ZERO);
}

#[test]
fn test_negative_duration_below_min() {
    let mut offsets = Offsets::default();
    let errors = field_errors(
        bind_from(&mut offsets, &[("O_WINDOW", "-1500ms"), ("O_DRIFT", "-3h")]).unwrap_err(),
    );

    assert_eq!(
        errors,
        [
            FieldError::OutOfRange {
                field: "window".to_string(),
                key: "O_WINDOW".to_string(),
                value: "-1.5s".to_string(),
                bound: Bound::Min,
                bound_value: "-1s".to_string(),
            },
            FieldError::OutOfRange {
                field: "drift".to_string(),
                key: "O_DRIFT".to_string(),
                value: "-10800s".to_string(),
                bound: Bound::Min,
                bound_value: "-2h".to_string(),
            },
        ]
    );
    assert_eq!(offsets.window, SignedDuration::ZERO);
    assert_eq!(offsets.drift, SignedDuration::ZERO);
}

#[derive(Debug, Default, Record)]
struct Lists {
    #[env("L_STRINGS,min:2")]
    strings: Vec<String>,

    #[env("L_NUMBERS")]
    numbers: Vec<u8>,

    #[env("L_FLAGS,defVal:true,max:3")]
    flags: Vec<bool>,

    #[env("L_OFFSETS")]
    offsets: Vec<i64>,
}

#[test]
fn test_list_fields() {
    let mut lists = Lists::default();
    bind_from(
        &mut lists,
        &[
            ("L_STRINGS", "a,b,c"),
            ("L_NUMBERS", "5,6,7"),
            ("L_OFFSETS", "-1,0,1"),
        ],
    )
    .unwrap();

    assert_eq!(lists.strings, ["a", "b", "c"]);
    assert_eq!(lists.numbers, [5, 6, 7]);
    assert_eq!(lists.flags, [true]);
    assert_eq!(lists.offsets, [-1, 0, 1]);
}

#[test]
fn test_list_length_below_min() {
    let mut lists = Lists::default();
    let errors = field_errors(bind_from(&mut lists, &[("L_STRINGS", "only")]).unwrap_err());

    assert!(matches!(
        errors.as_slice(),
        [FieldError::OutOfRange { field, value, bound: Bound::Min, .. }] if field == "strings" && value == "1"
    ));
    assert!(lists.strings.is_empty());
}

#[test]
fn test_list_element_failure_aborts_field() {
    let mut lists = Lists {
        numbers: vec![9],
        ..Lists::default()
    };
    let errors = field_errors(
        bind_from(&mut lists, &[("L_STRINGS", "a,b"), ("L_NUMBERS", "1,300,2")]).unwrap_err(),
    );

    assert!(matches!(
        errors.as_slice(),
        [FieldError::ConversionFailed { field, raw, .. }] if field == "numbers" && raw == "300"
    ));
    assert_eq!(lists.numbers, [9]);
}

#[test]
fn test_empty_list_value_yields_empty_list() {
    let mut lists = Lists {
        numbers: vec![1, 2],
        ..Lists::default()
    };
    bind_from(&mut lists, &[("L_STRINGS", "a,b"), ("L_NUMBERS", "")]).unwrap();
    assert!(lists.numbers.is_empty());
}

#[derive(Debug, Default, Record)]
struct Service {
    #[env("SVC_NAME,defVal:svc")]
    name: String,

    #[env(nested)]
    block: Block,

    internal: u32,
}

#[derive(Debug, Default, Record)]
struct Block {
    #[env("X,defVal:5")]
    x: u32,

    #[env(nested)]
    sub_block: SubBlock,
}

#[derive(Debug, Default, Record)]
struct SubBlock {
    #[env("SUB_UINT,defVal:9,min:1")]
    sub_uint: u64,
}

#[test]
fn test_nested_records() {
    let mut service = Service {
        internal: 77,
        ..Service::default()
    };
    bind_from(&mut service, &[]).unwrap();

    assert_eq!(service.name, "svc");
    assert_eq!(service.block.x, 5);
    assert_eq!(service.block.sub_block.sub_uint, 9);
    assert_eq!(service.internal, 77);
}

#[test]
fn test_nested_error_uses_field_path() {
    let mut service = Service::default();
    let errors = field_errors(bind_from(&mut service, &[("SUB_UINT", "0")]).unwrap_err());

    assert!(matches!(
        errors.as_slice(),
        [FieldError::OutOfRange { field, key, .. }] if field == "block.sub_block.sub_uint" && key == "SUB_UINT"
    ));
}

#[derive(Debug, Default, Record)]
struct WithUnsupported {
    #[env("U_TIMEOUTS")]
    timeouts: Vec<Duration>,

    #[env("U_LETTER,defVal:a")]
    letter: char,

    #[env("U_PORT,defVal:80")]
    port: u16,
}

#[test]
fn test_unsupported_types_are_reported_and_skipped() {
    let mut record = WithUnsupported::default();
    let errors = field_errors(bind_from(&mut record, &[("U_TIMEOUTS", "1s")]).unwrap_err());

    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors[0].to_string(),
        format!(
            "Unsupported type: {}, field: timeouts, env: U_TIMEOUTS",
            std::any::type_name::<Vec<Duration>>()
        )
    );
    assert!(matches!(&errors[1], FieldError::UnsupportedType { kind: "char", .. }));
    assert!(record.timeouts.is_empty());
    assert_eq!(record.port, 80);
}

#[test]
fn test_fail_fast_policy() {
    let binder = Binder::new()
        .with_source(source(&[("U_TIMEOUTS", "1s")]))
        .with_policy(Policy::FailFast);
    let mut record = WithUnsupported::default();
    let errors = field_errors(binder.bind(&mut record).unwrap_err());

    assert_eq!(errors.len(), 1);
    assert_eq!(record.port, 0);
}

#[derive(Debug, Default, Record)]
struct Generic<T> {
    #[env("G_VALUE,defVal:3")]
    value: T,
}

#[test]
fn test_generic_record() {
    let mut record = Generic::<i16>::default();
    bind_from(&mut record, &[]).unwrap();
    assert_eq!(record.value, 3);
}

#[derive(Debug, Default, Record)]
struct NameValueForm {
    #[env = "NV_COUNT,defVal:2"]
    count: u8,

    #[env("")]
    skipped: u8,
}

#[test]
fn test_name_value_form_and_empty_directive() {
    let mut record = NameValueForm {
        skipped: 4,
        ..NameValueForm::default()
    };
    bind_from(&mut record, &[("", "1")]).unwrap();
    assert_eq!(record.count, 2);
    assert_eq!(record.skipped, 4);
}

#[test]
fn test_bind_through_mutex() {
    let shared = Mutex::new(Service::default());
    Binder::new()
        .with_source(source(&[("X", "11")]))
        .bind(&shared)
        .unwrap();
    assert_eq!(shared.lock().unwrap().block.x, 11);

    let guard = shared.lock().unwrap();
    let error = Binder::new().with_source(source(&[])).bind(&shared).unwrap_err();
    assert!(matches!(error, BindError::Unassignable { .. }));
    drop(guard);
}

#[test]
fn test_from_source() {
    let service = Service::from_source(source(&[("SVC_NAME", "api")])).unwrap();
    assert_eq!(service.name, "api");
    assert_eq!(service.block.x, 5);

    let error = Bounded::from_source(source(&[("B_WORKERS", "99"), ("B_NAME", "abcd")])).unwrap_err();
    let error = error.downcast_ref::<BindError>().unwrap();
    assert_eq!(error.field_errors().unwrap().len(), 1);
}

#[derive(Debug, Default, Record)]
struct ProcessConfig {
    #[env("ENV_STRING,defVal:1")]
    test_string: String,
    #[env("ENV_DURATION")]
    test_duration: Duration,
    #[env("ENV_DURATION2,defVal:4s,min:1s,max:1m")]
    test_duration2: Duration,
    #[env("ENV_BOOLEAN1,defVal:true")]
    test_bool: bool,
    #[env("ENV_INT8,defVal:8")]
    test_int8: i8,
    #[env("ENV_FLOAT32,defVal:143.123,min:140")]
    test_float32: f32,
    #[env("ENV_FLOAT64,defVal:18.9,max:123.12")]
    test_float64: f64,
    #[env("ENV_SLICE_STRING")]
    test_slice_string: Vec<String>,
    #[env("ENV_SLICE_INT")]
    test_slice_int: Vec<u8>,
    #[env("ENV_SLICE_BOOL")]
    test_slice_bool: Vec<bool>,
}

const PROCESS_VARS: &[(&str, &str)] = &[
    ("ENV_STRING", "testString"),
    ("ENV_DURATION", "3s"),
    ("ENV_INT8", "7"),
    ("ENV_FLOAT64", "43.12"),
    ("ENV_SLICE_STRING", "stroka1,stroka2"),
    ("ENV_SLICE_INT", "5,6,7"),
    ("ENV_SLICE_BOOL", "true,false,true"),
];

#[test]
#[serial]
fn test_bind_from_process_environment() {
    env::remove_var("ENV_DURATION2");
    env::remove_var("ENV_BOOLEAN1");
    env::remove_var("ENV_FLOAT32");
    for (key, value) in PROCESS_VARS {
        env::set_var(key, value);
    }

    let mut config = ProcessConfig {
        test_slice_string: vec!["test1".to_string()],
        ..ProcessConfig::default()
    };
    envtag::bind(&mut config).unwrap();

    assert_eq!(config.test_string, "testString");
    assert_eq!(config.test_duration, Duration::from_secs(3));
    assert_eq!(config.test_duration2, Duration::from_secs(4));
    assert!(config.test_bool);
    assert_eq!(config.test_int8, 7);
    assert_eq!(config.test_float32, 143.123);
    assert_eq!(config.test_float64, 43.12);
    assert_eq!(config.test_slice_string, ["stroka1", "stroka2"]);
    assert_eq!(config.test_slice_int, [5, 6, 7]);
    assert_eq!(config.test_slice_bool, [true, false, true]);

    for (key, _) in PROCESS_VARS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_reports_all_errors() {
    env::set_var("ENV_DURATION2", "2m");
    env::set_var("ENV_INT8", "not_a_number");

    let error = ProcessConfig::from_env().unwrap_err();
    let error = error.downcast_ref::<BindError>().unwrap();
    assert_eq!(error.field_errors().unwrap().len(), 2);

    env::remove_var("ENV_DURATION2");
    env::remove_var("ENV_INT8");
}
