use ravun::{
    diagnostics::RavunError,
    parser,
    runtime::Interpreter,
    value::{Value, ValueKind},
};

fn eval(source: &str) -> Value {
    let mut interpreter = Interpreter::new();
    interpreter
        .eval_source(source)
        .expect("evaluation should succeed")
}

fn eval_error(source: &str) -> RavunError {
    let mut interpreter = Interpreter::new();
    match interpreter.eval_source(source) {
        Ok(value) => panic!("expected error, received value {value}"),
        Err(err) => err,
    }
}

fn expect_int(value: &Value) -> i64 {
    match value.0.as_ref() {
        ValueKind::Int(n) => *n,
        _ => panic!("expected int, found {}", value.type_name()),
    }
}

fn expect_float(value: &Value) -> f64 {
    match value.0.as_ref() {
        ValueKind::Float(f) => *f,
        _ => panic!("expected float, found {}", value.type_name()),
    }
}

fn expect_bool(value: &Value) -> bool {
    match value.0.as_ref() {
        ValueKind::Bool(b) => *b,
        _ => panic!("expected bool, found {}", value.type_name()),
    }
}

fn expect_string(value: &Value) -> String {
    match value.0.as_ref() {
        ValueKind::Str(s) => s.clone(),
        _ => panic!("expected string, found {}", value.type_name()),
    }
}

#[test]
fn evaluates_arithmetic_with_precedence() {
    assert_eq!(expect_int(&eval("return 2 + 3 * 4;")), 14);
    assert_eq!(expect_int(&eval("return (2 + 3) * 4;")), 20);
    assert_eq!(expect_int(&eval("return 10 % 3;")), 1);
}

#[test]
fn integer_division_truncates() {
    assert_eq!(expect_int(&eval("return 7 / 2;")), 3);
}

#[test]
fn mixed_arithmetic_promotes_to_float() {
    let value = eval("return 1 / 2.0;");
    assert!((expect_float(&value) - 0.5).abs() < f64::EPSILON);
}

#[test]
fn power_binds_tighter_than_negation() {
    assert_eq!(expect_int(&eval("return 2 ^ 10;")), 1024);
    assert_eq!(expect_int(&eval("return -2 ^ 2;")), -4);
    // left associative
    assert_eq!(expect_int(&eval("return 2 ^ 3 ^ 2;")), 64);
}

#[test]
fn concatenates_strings() {
    let value = eval(r#"return "foo" + "bar";"#);
    assert_eq!(expect_string(&value), "foobar");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = eval_error("return 1 / 0;");
    assert!(err.to_string().contains("integer arithmetic error"));
}

#[test]
fn negating_the_smallest_int_is_a_runtime_error() {
    let err = eval_error("let x = 0 - 9223372036854775807 - 1; return -x;");
    assert!(err.to_string().contains("integer arithmetic error"));
}

#[test]
fn negative_integer_exponents_are_rejected() {
    let err = eval_error("return 2 ^ (0 - 1);");
    assert!(err.to_string().contains("integer arithmetic error"));

    let value = eval("return 2.0 ^ (0 - 1);");
    assert!((expect_float(&value) - 0.5).abs() < f64::EPSILON);
}

#[test]
fn mutable_bindings_can_be_reassigned() {
    let value = eval("let mut x = 1; x = x + 1; return x;");
    assert_eq!(expect_int(&value), 2);
}

#[test]
fn immutable_bindings_reject_assignment() {
    let err = eval_error("let x = 1; x = 2;");
    assert!(err.to_string().contains("immutable"));
}

#[test]
fn compound_assignment_operators() {
    let value = eval("let mut x = 10; x += 5; x -= 1; x *= 2; x /= 4; return x;");
    assert_eq!(expect_int(&value), 7);
}

#[test]
fn if_else_chooses_a_branch() {
    let value = eval("let x = 7; if x > 5 { return 1; } else { return 0; }");
    assert_eq!(expect_int(&value), 1);
}

#[test]
fn while_loop_accumulates() {
    let value = eval(
        "let mut total = 0;
         let mut n = 1;
         while n <= 10 {
             total += n;
             n += 1;
         }
         return total;",
    );
    assert_eq!(expect_int(&value), 55);
}

#[test]
fn for_iterates_half_open_range() {
    let value = eval(
        "let mut total = 0;
         for n in 0..5 {
             total += n;
         }
         return total;",
    );
    assert_eq!(expect_int(&value), 10);
}

#[test]
fn for_iterates_arrays_and_strings() {
    let value = eval(
        "let mut total = 0;
         for n in [2, 4, 8] {
             total += n;
         }
         return total;",
    );
    assert_eq!(expect_int(&value), 14);

    let value = eval(
        r#"let mut out = "";
           for ch in "abc" {
               out += ch;
               out += "-";
           }
           return out;"#,
    );
    assert_eq!(expect_string(&value), "a-b-c-");
}

#[test]
fn loop_binding_is_scoped_to_the_iteration() {
    let err = eval_error("for n in 0..3 { n; } return n;");
    assert!(err.to_string().contains("undefined variable `n`"));
}

#[test]
fn recursive_functions() {
    let value = eval(
        "fn fib(n: int) -> int {
             if n < 2 {
                 return n;
             }
             return fib(n - 1) + fib(n - 2);
         }
         return fib(10);",
    );
    assert_eq!(expect_int(&value), 55);
}

#[test]
fn functions_capture_their_defining_environment() {
    let value = eval(
        "let base = 100;
         fn offset(n: int) -> int {
             return base + n;
         }
         return offset(23);",
    );
    assert_eq!(expect_int(&value), 123);
}

#[test]
fn indexes_arrays_and_strings() {
    assert_eq!(expect_int(&eval("let xs = [10, 20, 30]; return xs[1];")), 20);
    assert_eq!(
        expect_string(&eval(r#"let s = "ravun"; return s[0];"#)),
        "r"
    );
}

#[test]
fn index_assignment_writes_through() {
    let value = eval("let mut xs = [1, 2, 3]; xs[0] = 9; return xs[0] + xs[2];");
    assert_eq!(expect_int(&value), 12);
}

#[test]
fn out_of_bounds_index_is_a_runtime_error() {
    let err = eval_error("let xs = [1]; return xs[3];");
    assert!(err.to_string().contains("out of bounds"));
}

#[test]
fn logical_operators_short_circuit() {
    let value = eval(
        "fn boom() -> bool {
             1 / 0;
             return true;
         }
         return false && boom();",
    );
    assert!(!expect_bool(&value));

    let value = eval(
        "fn boom() -> bool {
             1 / 0;
             return true;
         }
         return true || boom();",
    );
    assert!(expect_bool(&value));
}

#[test]
fn equality_covers_composites() {
    assert!(expect_bool(&eval("return [1, 2] == [1, 2];")));
    assert!(expect_bool(&eval("return 0..3 == 0..3;")));
    assert!(!expect_bool(&eval(r#"return "a" == "b";"#)));
}

#[test]
fn comparing_bools_is_a_runtime_error() {
    let err = eval_error("return true < false;");
    assert!(err.to_string().contains("cannot compare"));
}

#[test]
fn last_expression_is_the_script_value() {
    assert_eq!(expect_int(&eval("1 + 1;")), 2);
}

#[test]
fn to_string_builtin() {
    let value = eval("return to_string(42) + to_string(true);");
    assert_eq!(expect_string(&value), "42true");
}

#[test]
fn run_program_calls_main() {
    let program = parser::parse_program(
        "fn main() -> int {
             return 7;
         }",
    )
    .expect("program should parse");
    let mut interpreter = Interpreter::new();
    let value = interpreter
        .run_program(&program)
        .expect("program should run");
    assert_eq!(expect_int(&value), 7);
}

#[test]
fn run_program_without_main_is_a_script() {
    let program = parser::parse_program("let x = 40; x + 2;").expect("program should parse");
    let mut interpreter = Interpreter::new();
    let value = interpreter
        .run_program(&program)
        .expect("program should run");
    assert_eq!(expect_int(&value), 42);
}

#[test]
fn module_bindings_stay_scoped() {
    let err = eval_error("mod helpers { let secret = 1; } return secret;");
    assert!(err.to_string().contains("undefined variable `secret`"));
}

#[test]
fn wrong_arity_call_is_a_runtime_error() {
    let err = eval_error(
        "fn double(n: int) -> int {
             return n * 2;
         }
         return double(1, 2);",
    );
    assert!(err.to_string().contains("expected 1 arguments"));
}
