//! End-to-end formatting scenarios

use formula_beautifier::{format, format_with, FormatOptions};
use pretty_assertions::assert_eq;

/// Simple IF becomes a three-argument block
#[test]
fn test_simple_if() {
    assert_eq!(
        format("=IF(A1>0,\"Yes\",\"No\")"),
        "=IF(\n    A1>0,\n    \"Yes\",\n    \"No\"\n)"
    );
}

/// Nested IF is indented one level deeper than its parent
#[test]
fn test_nested_if() {
    let expected = "\
=IF(
    A1>0,
    IF(
        B1<10,
        \"OK\",
        \"NO\"
    ),
    \"FAIL\"
)";
    assert_eq!(format("=IF(A1>0,IF(B1<10,\"OK\",\"NO\"),\"FAIL\")"), expected);
}

/// Arithmetic without significant calls stays on one line
#[test]
fn test_arithmetic_is_unchanged() {
    assert_eq!(format("=A1+B1*2"), "=A1+B1*2");
}

/// Unterminated string literal leaves the formula untouched
#[test]
fn test_unterminated_string_is_identity() {
    assert_eq!(format("=IF(A1>0,\"Yes"), "=IF(A1>0,\"Yes");
}

/// Sheet-qualified ranges stay a single token
#[test]
fn test_vlookup_with_sheet_reference() {
    assert_eq!(
        format("=VLOOKUP(A1,Sheet2!A:B,2,FALSE)"),
        "=VLOOKUP(\n    A1,\n    Sheet2!A:B,\n    2,\n    FALSE\n)"
    );
}

#[test]
fn test_empty_string() {
    assert_eq!(format(""), "");
}

#[test]
fn test_formula_without_equals() {
    let result = format("IF(A1>0,\"Yes\",\"No\")");
    assert!(!result.starts_with('='));
    assert!(result.starts_with("IF(\n"));
}

#[test]
fn test_formula_with_surrounding_whitespace() {
    let result = format("  =IF(A1>0,\"Yes\",\"No\")  ");
    assert!(result.starts_with("=IF("));
    assert!(result.ends_with(')'));
}

#[test]
fn test_sumifs_criteria_strings() {
    assert_eq!(
        format("=SUMIFS(D:D,A:A,\">=2023\",B:B,\"Sales\")"),
        "=SUMIFS(\n    D:D,\n    A:A,\n    \">=2023\",\n    B:B,\n    \"Sales\"\n)"
    );
}

#[test]
fn test_and_with_comparisons() {
    assert_eq!(
        format("=AND(A1>0,B1<10,C1=\"Active\")"),
        "=AND(\n    A1>0,\n    B1<10,\n    C1=\"Active\"\n)"
    );
}

#[test]
fn test_quoted_strings_with_commas_and_quotes() {
    assert_eq!(
        format("=IF(A1>0,\"Hello, World\",\"Say \"\"Bye\"\"\")"),
        "=IF(\n    A1>0,\n    \"Hello, World\",\n    \"Say \"\"Bye\"\"\"\n)"
    );
}

#[test]
fn test_mixed_functions() {
    let expected = "\
=IF(
    AND(
        A1>0,
        B1<10
    ),
    SUM(C1:C10),
    \"N/A\"
)";
    assert_eq!(format("=IF(AND(A1>0,B1<10),SUM(C1:C10),\"N/A\")"), expected);
}

#[test]
fn test_custom_indent_size() {
    let options = FormatOptions::default().with_indent_size(2);
    let expected = "\
=IF(
  A1>0,
  IF(
    B1<10,
    \"OK\",
    \"NO\"
  ),
  \"FAIL\"
)";
    assert_eq!(
        format_with("=IF(A1>0,IF(B1<10,\"OK\",\"NO\"),\"FAIL\")", &options),
        expected
    );
}

#[test]
fn test_let_with_lambda() {
    let expected = "\
=LET(
    x,
    A1*2,
    f,
    LAMBDA(
        y,
        y+x
    ),
    f(3)
)";
    assert_eq!(format("=LET(x,A1*2,f,LAMBDA(y,y+x),f(3))"), expected);
}

#[test]
fn test_future_function_prefix() {
    assert_eq!(
        format("=_xlfn.XLOOKUP(A1,B:B,C:C)"),
        "=_xlfn.XLOOKUP(\n    A1,\n    B:B,\n    C:C\n)"
    );
}

#[test]
fn test_function_names_keep_their_case() {
    assert_eq!(format("=if(a1,1,2)"), "=if(\n    a1,\n    1,\n    2\n)");
}

#[test]
fn test_quoted_sheet_names_and_errors() {
    assert_eq!(
        format("=IFERROR('Q1 Sales'!B2/C2,#N/A)"),
        "=IFERROR('Q1 Sales'!B2/C2, #N/A)"
    );
}

#[test]
fn test_extra_significant_function() {
    let options = FormatOptions::default().with_multiline_function("IFERROR");
    assert_eq!(
        format_with("=IFERROR(A1/B1,0)", &options),
        "=IFERROR(\n    A1/B1,\n    0\n)"
    );
}

#[test]
fn test_malformed_inputs_are_identity() {
    for input in [
        "=SUM(A1",
        "=A1)",
        "=A1,B1",
        "=A1 B1",
        "=",
        "=1+",
        "just some words here",
        "=IF(A1>0,\"Yes\",\"No\"))",
        "=A1 ~ B1",
    ] {
        assert_eq!(format(input), input, "{input:?}");
    }
}

#[test]
fn test_formatting_is_idempotent() {
    for input in [
        "=IF(A1>0,IF(B1<10,\"OK\",\"NO\"),\"FAIL\")",
        "=SUM(IF(A1:A10>0,1,0))",
        "=VLOOKUP(A1,Sheet2!A:B,2,FALSE)&\" units\"",
        "=IF(A1,,0)",
    ] {
        let once = format(input);
        assert_eq!(format(&once), once, "{input:?}");
    }
}
