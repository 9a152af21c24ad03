use tagpath::{Path, PathErrorKind};

fn elements(input: &str) -> Vec<String> {
    Path::parse(input).unwrap().elements().to_vec()
}

fn error(input: &str) -> PathErrorKind {
    Path::parse(input).unwrap_err().kind().clone()
}

// ============================================================================
// Tokenization
// ============================================================================

#[facet_testhelpers::test]
fn root_markers_are_stripped() {
    assert_eq!(elements("$..foo.bar"), ["foo", "bar"]);
    assert_eq!(elements("$.baz[0].qux"), ["baz", "0", "qux"]);
    assert_eq!(elements("  $. address.city  "), ["address", "city"]);
}

#[facet_testhelpers::test]
fn empty_paths_have_no_elements() {
    assert!(Path::parse("").unwrap().is_empty());
    assert!(Path::parse("   ").unwrap().is_empty());
    assert!(Path::parse("$.").unwrap().is_empty());
    assert!(Path::parse("$..").unwrap().is_empty());
}

#[facet_testhelpers::test]
fn all_separators_split() {
    assert_eq!(elements("a.b/c\\d"), ["a", "b", "c", "d"]);
    assert_eq!(elements("a..b//c"), ["a", "b", "c"]);
    assert_eq!(elements("list[0][1]"), ["list", "0", "1"]);
    assert_eq!(elements("[0]"), ["0"]);
    assert_eq!(elements("a[]b"), ["a", "b"]);
}

#[facet_testhelpers::test]
fn quotes_keep_separators_literal() {
    assert_eq!(elements(r#""a.b/c""#), ["a.b/c"]);
    assert_eq!(elements(r#"hobbys["Free climbing"]"#), ["hobbys", "Free climbing"]);
    assert_eq!(elements(r#"map."[x]".y"#), ["map", "[x]", "y"]);
    assert_eq!(elements(r#"pre"mid"post"#), ["premidpost"]);
}

#[facet_testhelpers::test]
fn escapes_inside_quotes() {
    assert_eq!(elements(r#""a\"b""#), [r#"a"b"#]);
    assert_eq!(elements(r#""a\\b""#), [r"a\b"]);
    assert_eq!(elements(r#""\.\/\[\]""#), ["./[]"]);
}

#[facet_testhelpers::test]
fn non_ascii_elements() {
    assert_eq!(elements("straße.город"), ["straße", "город"]);
}

// ============================================================================
// Tokenization errors
// ============================================================================

#[facet_testhelpers::test]
fn nested_brackets() {
    assert_eq!(error("$..[[0].foo"), PathErrorKind::NestedBrackets);
}

#[facet_testhelpers::test]
fn unmatched_close_bracket() {
    assert_eq!(error("$..0].foo"), PathErrorKind::UnmatchedCloseBracket);
}

#[facet_testhelpers::test]
fn unclosed_brackets() {
    assert_eq!(error("list[0"), PathErrorKind::UnclosedBrackets);
    assert_eq!(error("list[0.1]"), PathErrorKind::UnclosedBrackets);
    assert_eq!(error("list[a/b]"), PathErrorKind::UnclosedBrackets);
}

#[facet_testhelpers::test]
fn unknown_escape() {
    assert_eq!(
        error(r#"address["\nstreet"]"#),
        PathErrorKind::UnknownEscape('n')
    );
}

#[facet_testhelpers::test]
fn dangling_escape() {
    assert_eq!(error(r#""foo\"#), PathErrorKind::DanglingEscape);
}

#[facet_testhelpers::test]
fn unclosed_quotes() {
    assert_eq!(error(r#""foo"#), PathErrorKind::UnclosedQuotes);
}

#[facet_testhelpers::test]
fn control_characters() {
    assert_eq!(error("a\u{7}b"), PathErrorKind::ControlCharacter('\u{7}'));
    assert_eq!(error("\"a\tb\""), PathErrorKind::ControlCharacter('\t'));
    assert_eq!(error("a\tb"), PathErrorKind::ControlCharacter('\t'));
}

#[facet_testhelpers::test]
fn spaces_need_quotes() {
    assert_eq!(error("first name"), PathErrorKind::SpaceInElement);
    assert_eq!(error("[first name]"), PathErrorKind::SpaceInElement);
    assert_eq!(error("a\u{a0}b"), PathErrorKind::SpaceInElement);
}

#[facet_testhelpers::test]
fn error_messages() {
    let message = |input: &str| Path::parse(input).unwrap_err().to_string();
    assert_eq!(message("a[[0]]"), "nested brackets not permitted");
    assert_eq!(message("a]"), "closed bracket without matching open");
    assert_eq!(message("\"a"), "quotes left open");
    assert_eq!(message("a b"), "space not permitted in element");
}

// ============================================================================
// Rendering
// ============================================================================

#[facet_testhelpers::test]
fn display_is_dotted() {
    let path: Path = "$.adresses1[1]/ZIP".parse().unwrap();
    assert_eq!(path.to_string(), "adresses1.1.ZIP");
    assert_eq!(path.len(), 3);
}

#[facet_testhelpers::test]
fn display_reparses_to_the_same_path() {
    let path = Path::from_elements(["hobbys", "Free climbing", "a.b", r#"q"u\o"#, "[x]", "$", ""])
        .unwrap();
    assert_eq!(path.len(), 6);
    let rendered = path.to_string();
    assert_eq!(Path::parse(&rendered).unwrap(), path);
}

#[facet_testhelpers::test]
fn built_paths_reject_control_characters() {
    let err = Path::from_elements(["address", "a\tb"]).unwrap_err();
    assert_eq!(err.kind(), &PathErrorKind::ControlCharacter('\t'));
    assert_eq!(err.to_string(), "control character '\\t' not permitted");

    let err = Path::from_elements(["line\u{0}"]).unwrap_err();
    assert_eq!(err.kind(), &PathErrorKind::ControlCharacter('\0'));

    // everything else renders to text that parses back
    let path = Path::from_elements(["del\u{7f}", "non\u{a0}breaking", "é"]).unwrap();
    assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
}
