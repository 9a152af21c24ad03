use std::collections::{BTreeMap, HashMap};

use indoc::indoc;
use facet::Facet;
use tagpath::{DescriptorError, apply_descriptor, set_defaults};

#[derive(Facet, Debug, Clone, Default, PartialEq)]
struct Endpoint {
    host: String,
    port: u16,
    secure: bool,
}

#[facet_testhelpers::test]
fn string_slice_defined_by_json() {
    #[derive(Facet, Debug, Clone, Default, PartialEq)]
    struct StructureSlice {
        #[facet(default_value = r#"["a","b"]"#)]
        string_slice: Vec<String>,
        #[facet(default_value = r#"["a","b"]"#)]
        string_slice_ptr: Option<Vec<String>>,
    }

    let mut structure = StructureSlice::default();
    set_defaults(&mut structure).unwrap();
    assert_eq!(structure.string_slice, ["a", "b"]);
    assert_eq!(
        structure.string_slice_ptr,
        Some(vec!["a".to_string(), "b".to_string()])
    );
}

#[facet_testhelpers::test]
fn string_map_of_int_defined_by_json() {
    #[derive(Facet, Debug, Clone, Default, PartialEq)]
    struct StructureMap {
        #[facet(default_value = r#"{"a": 5,"b": 6}"#)]
        string_map_of_int: HashMap<String, i32>,
        #[facet(default_value = r#"{"a": 5,"b": 6}"#)]
        string_map_of_int_ptr: Option<HashMap<String, i32>>,
    }

    let expected = HashMap::from([("a".to_string(), 5), ("b".to_string(), 6)]);
    let mut structure = StructureMap::default();
    set_defaults(&mut structure).unwrap();
    assert_eq!(structure.string_map_of_int, expected);
    assert_eq!(structure.string_map_of_int_ptr, Some(expected));
}

#[facet_testhelpers::test]
fn malformed_json_leaves_the_map_empty() {
    #[derive(Facet, Debug, Clone, Default, PartialEq)]
    struct StructureMapError {
        #[facet(default_value = r#"{"a": 5},"b": 6}}"#)]
        string_map_of_int: HashMap<String, i32>,
    }

    let mut structure = StructureMapError::default();
    let err = set_defaults(&mut structure).unwrap_err();
    assert!(
        err.to_string()
            .starts_with("failed to parse default tag for field string_map_of_int: trailing characters"),
        "{err}"
    );
    assert!(matches!(err.descriptor_error(), DescriptorError::Literal(_)));
    assert!(structure.string_map_of_int.is_empty());
}

#[facet_testhelpers::test]
fn literals_replace_existing_contents() {
    #[derive(Facet, Debug, Clone, Default, PartialEq)]
    struct Ports {
        #[facet(default_value = "[80, 443]")]
        open: Vec<u16>,
        #[facet(default_value = r#"{"1": true}"#)]
        enabled: BTreeMap<u8, bool>,
    }

    let mut ports = Ports {
        open: vec![22, 23, 25],
        enabled: BTreeMap::from([(2, false)]),
    };
    set_defaults(&mut ports).unwrap();
    assert_eq!(ports.open, [80, 443]);
    assert_eq!(ports.enabled, BTreeMap::from([(1, true)]));
}

#[facet_testhelpers::test]
fn records_inside_literals() {
    #[derive(Facet, Debug, Clone, Default, PartialEq)]
    struct Cluster {
        #[facet(default_value = r#"[{"host": "a.example", "port": 8080}, {"secure": "t"}]"#)]
        nodes: Vec<Endpoint>,
        #[facet(default_value = r#"{"primary": {"host": "db", "port": 5432}, "replica": null}"#)]
        databases: HashMap<String, Option<Endpoint>>,
    }

    let mut cluster = Cluster::default();
    set_defaults(&mut cluster).unwrap();
    assert_eq!(
        cluster.nodes,
        [
            Endpoint {
                host: "a.example".into(),
                port: 8080,
                secure: false
            },
            Endpoint {
                host: "".into(),
                port: 0,
                secure: true
            },
        ]
    );
    assert_eq!(
        cluster.databases["primary"],
        Some(Endpoint {
            host: "db".into(),
            port: 5432,
            secure: false
        })
    );
    assert_eq!(cluster.databases["replica"], None);
}

#[facet_testhelpers::test]
fn multi_line_literal() {
    let mut matrix: Vec<Vec<f64>> = Vec::new();
    apply_descriptor(
        &mut matrix,
        indoc! {"
            [
                [1, 0.5],
                [-2.25e1]
            ]
        "},
        None,
    )
    .unwrap();
    assert_eq!(matrix, vec![vec![1.0, 0.5], vec![-22.5]]);
}

#[facet_testhelpers::test]
fn fixed_size_arrays_need_the_exact_length() {
    let mut pair = [0u8; 2];
    apply_descriptor(&mut pair, "[3, 4]", None).unwrap();
    assert_eq!(pair, [3, 4]);

    let err = apply_descriptor(&mut pair, "[1, 2, 3]", None).unwrap_err();
    assert!(matches!(err, DescriptorError::LiteralMismatch { .. }));
    assert_eq!(pair, [3, 4]);
}

#[facet_testhelpers::test]
fn shape_mismatches_leave_the_field_unmodified() {
    let mut names = vec!["kept".to_string()];
    for literal in [r#"{"a": 1}"#, "[[1]]", "[null]", r#""text""#] {
        let err = apply_descriptor(&mut names, literal, None).unwrap_err();
        assert!(matches!(err, DescriptorError::LiteralMismatch { .. }), "{literal}");
        assert_eq!(names, ["kept"]);
    }

    let mut counts: Vec<u8> = vec![9];
    let err = apply_descriptor(&mut counts, "[1, 256]", None).unwrap_err();
    assert!(matches!(err, DescriptorError::InvalidSyntax { .. }));
    assert_eq!(counts, [9]);

    let mut endpoints: Vec<Endpoint> = Vec::new();
    let err = apply_descriptor(&mut endpoints, r#"[{"address": "x"}]"#, None).unwrap_err();
    assert!(matches!(err, DescriptorError::UnknownField { ref name } if name == "address"));
    assert!(endpoints.is_empty());
}
