use ravun::{
    analyzer,
    diagnostics::Diagnostic,
    lexer::{Keyword, Lexer, TokenKind},
    parser,
};

fn parse_errors(source: &str) -> Vec<Diagnostic> {
    parser::parse_program(source).expect_err("expected parse errors")
}

fn check(source: &str) -> Vec<Diagnostic> {
    let program = parser::parse_program(source).expect("source should parse");
    analyzer::analyze(&program)
}

fn errors(source: &str) -> Vec<String> {
    check(source)
        .into_iter()
        .filter(|diag| !diag.is_warning())
        .map(|diag| diag.message)
        .collect()
}

fn warnings(source: &str) -> Vec<String> {
    check(source)
        .into_iter()
        .filter(Diagnostic::is_warning)
        .map(|diag| diag.message)
        .collect()
}

fn assert_clean(source: &str) {
    let diags = check(source);
    assert!(diags.is_empty(), "expected no diagnostics, found {diags:?}");
}

#[test]
fn lexes_a_representative_statement() {
    let tokens = Lexer::new("let mut total = 0;")
        .tokenize()
        .expect("should lex");
    let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword(Keyword::Let),
            TokenKind::Keyword(Keyword::Mut),
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Int,
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn parser_recovers_and_reports_every_error() {
    let diags = parse_errors(
        "let = 1;
         let ok = 2;
         let also = ;",
    );
    assert_eq!(diags.len(), 2);
    assert!(diags
        .iter()
        .all(|diag| diag.span.is_some()));
}

#[test]
fn statements_require_semicolons() {
    let diags = parse_errors("let x = 1");
    assert!(diags[0].message.contains("expected `;`"));

    let diags = parse_errors("1 + 2");
    assert!(diags[0].message.contains("expected `;`"));
}

#[test]
fn reserved_keywords_are_rejected() {
    let diags = parse_errors("match x { };");
    assert!(diags[0].message.contains("reserved"));
}

#[test]
fn assignment_targets_are_restricted() {
    let diags = parse_errors("1 = 2;");
    assert!(diags[0].message.contains("invalid assignment target"));
}

#[test]
fn clean_program_produces_no_diagnostics() {
    assert_clean(
        "fn add(a: int, b: int) -> int {
             return a + b;
         }
         fn main() {
             let total = add(1, 2);
             println(total);
         }",
    );
}

#[test]
fn type_mismatch_in_let() {
    let errs = errors(r#"let x: int = "hi"; println(x);"#);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].contains("cannot initialize `x`"));
}

#[test]
fn int_widens_to_float_in_let() {
    assert_clean("let x: float = 1; println(x);");
}

#[test]
fn undefined_names_are_errors() {
    let errs = errors("println(missing);");
    assert!(errs[0].contains("undefined variable `missing`"));

    let errs = errors("missing();");
    assert!(errs[0].contains("undefined function `missing`"));
}

#[test]
fn assignment_checks_mutability_and_type() {
    let errs = errors("let x = 1; x = 2; println(x);");
    assert!(errs[0].contains("immutable variable `x`"));

    let errs = errors(r#"let mut x = 1; x = "two"; println(x);"#);
    assert!(errs[0].contains("cannot assign `string`"));
}

#[test]
fn index_assignment_through_immutable_binding_is_an_error() {
    let errs = errors("let xs = [1, 2]; xs[0] = 9; println(xs);");
    assert!(errs[0].contains("immutable variable `xs`"));
}

#[test]
fn builtin_arity_is_checked() {
    let errs = errors(r#"print("a", "b");"#);
    assert!(errs[0].contains("expects 1 argument(s), found 2"));
}

#[test]
fn function_argument_types_are_checked() {
    let errs = errors(
        "fn double(n: int) -> int {
             return n * 2;
         }
         double(true);",
    );
    assert!(errs[0].contains("expected `int`, found `bool`"));
}

#[test]
fn conditions_must_be_bool() {
    let errs = errors(r#"if 1 { println("x"); }"#);
    assert!(errs[0].contains("`if` condition must be `bool`"));

    let errs = errors(r#"while "yes" { println("x"); }"#);
    assert!(errs[0].contains("`while` condition must be `bool`"));
}

#[test]
fn return_type_and_placement_are_checked() {
    let errs = errors(
        "fn answer() -> int {
             return true;
         }
         answer();",
    );
    assert!(errs[0].contains("expected return type `int`, found `bool`"));

    let errs = errors("return 1;");
    assert!(errs[0].contains("`return` outside of a function"));
}

#[test]
fn range_bounds_must_be_int() {
    let errs = errors("for i in 1.5..3 { println(i); }");
    assert!(errs[0].contains("range bounds must be `int`"));
}

#[test]
fn iterables_are_restricted() {
    let errs = errors("for x in true { println(x); }");
    assert!(errs[0].contains("cannot iterate over `bool`"));
}

#[test]
fn unused_variables_warn_but_do_not_error() {
    let source = "fn main() { let x = 1; }";
    assert!(errors(source).is_empty());
    let warns = warnings(source);
    assert_eq!(warns.len(), 1);
    assert!(warns[0].contains("unused variable `x`"));
}

#[test]
fn unused_parameters_warn() {
    let warns = warnings(
        "fn greet(name: string) {
             println(\"hi\");
         }
         greet(\"ada\");",
    );
    assert!(warns[0].contains("unused parameter `name`"));
}

#[test]
fn underscore_prefix_silences_unused_warning() {
    assert_clean("fn main() { let _scratch = 1; }");
}

#[test]
fn unused_globals_warn() {
    let warns = warnings("let orphan = 1;");
    assert!(warns[0].contains("unused variable `orphan`"));
}

#[test]
fn main_must_be_a_function() {
    let errs = errors("let main = 1;");
    assert!(errs[0].contains("`main` must be a function"));
}

#[test]
fn missing_main_is_allowed() {
    assert_clean(r#"print("Hello, World!");"#);
}

#[test]
fn duplicate_definitions_in_a_scope() {
    let errs = errors("let x = 1; let x = 2; println(x);");
    assert!(errs[0].contains("already defined"));
}

#[test]
fn shadowing_in_inner_scopes_is_allowed() {
    assert_clean(
        "let x = 1;
         {
             let x = 2;
             println(x);
         }
         println(x);",
    );
}

#[test]
fn struct_declarations_register_a_type() {
    assert_clean(
        "struct Point {
             x: int,
             y: int,
         }
         impl Point {
             fn origin_norm() -> int {
                 return 0;
             }
         }
         println(\"ok\");",
    );
}

#[test]
fn impl_requires_a_known_type() {
    let errs = errors(
        "impl Ghost {
             fn spook() {
                 println(\"boo\");
             }
         }",
    );
    assert!(errs[0].contains("cannot impl unknown type `Ghost`"));
}

#[test]
fn struct_fields_need_known_types() {
    let errs = errors(
        "struct Reading {
             value: weird,
         }",
    );
    assert!(errs[0].contains("unknown type `weird`"));
}

#[test]
fn annotations_support_arrays() {
    assert_clean("let xs: int[] = [1, 2, 3]; println(xs);");
    assert_clean("let xs: int[3] = [1, 2, 3]; println(xs);");
    let errs = errors("let xs: int[2] = [1, 2, 3]; println(xs);");
    assert!(errs[0].contains("cannot initialize `xs`"));
}

#[test]
fn recursion_resolves_inside_the_body() {
    assert_clean(
        "fn countdown(n: int) {
             if n > 0 {
                 countdown(n - 1);
             }
         }
         countdown(3);",
    );
}
