//! Parser tests

use oxi::ast::*;
use oxi::lexer::lex;
use oxi::parser::{ParseError, parse_expression, parse_program};
use oxi::value::Value;
use pretty_assertions::assert_eq;

fn parse_source(source: &str) -> Stmt {
    let tokens = lex(source).unwrap();
    parse_program(&tokens).unwrap()
}

fn parse_err(source: &str) -> ParseError {
    let tokens = lex(source).unwrap();
    parse_program(&tokens).unwrap_err()
}

/// Render an expression as an s-expression, ignoring tokens
fn sexp(expr: &Expr) -> String {
    match expr {
        Expr::Binary { left, right, op, .. } => {
            format!("({} {} {})", op.as_str(), sexp(left), sexp(right))
        }
        Expr::Unary { op, right, .. } => format!("({} {})", op.as_str(), sexp(right)),
        Expr::Grouping { inner, .. } => format!("(group {})", sexp(inner)),
        Expr::Literal { value, .. } => value.to_literal(),
        Expr::Identifier { name, .. } => name.clone(),
        Expr::List { elements, .. } => format!("(list{})", args(elements)),
        Expr::Range { from, to, .. } => format!("(range {} {})", sexp(from), sexp(to)),
        Expr::Property { object, name, .. } => format!("(. {} {})", sexp(object), name),
        Expr::FunctionCall { callee, args: a, .. } => format!("(call {}{})", sexp(callee), args(a)),
        Expr::VerbCall { object, verb, args: a, .. } => {
            format!("(verb {} {}{})", sexp(object), verb, args(a))
        }
        Expr::Try {
            expr,
            error_filters,
            alternative,
            ..
        } => format!(
            "(try {} [{}] {})",
            sexp(expr),
            error_filters.iter().map(sexp).collect::<Vec<_>>().join(" "),
            sexp(alternative)
        ),
    }
}

fn args(exprs: &[Expr]) -> String {
    exprs.iter().map(|e| format!(" {}", sexp(e))).collect()
}

fn expr(source: &str) -> String {
    let tokens = lex(source).unwrap();
    sexp(&parse_expression(&tokens).unwrap())
}

fn statements(program: &Stmt) -> &[Stmt] {
    match program {
        Stmt::Block { statements } => statements,
        other => panic!("Expected block, got {:?}", other),
    }
}

// ==================== Expressions ====================

#[test]
fn test_precedence_mul_over_add() {
    assert_eq!(expr("1 + 2 * 3"), "(+ 1 (* 2 3))");
    assert_eq!(expr("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
}

#[test]
fn test_left_associativity() {
    assert_eq!(expr("1 - 2 - 3"), "(- (- 1 2) 3)");
    assert_eq!(expr("8 / 4 % 3"), "(% (/ 8 4) 3)");
}

#[test]
fn test_logical_levels() {
    assert_eq!(expr("a || b && c"), "(|| a (&& b c))");
    assert_eq!(expr("a ^ b || c"), "(|| (^ a b) c)");
    assert_eq!(expr("1 < 2 && 3 == 3"), "(&& (< 1 2) (== 3 3))");
}

#[test]
fn test_assignment_is_right_associative() {
    assert_eq!(expr("a = b = 1 + 2"), "(= a (= b (+ 1 2)))");
}

#[test]
fn test_assignment_requires_identifier() {
    let tokens = lex("1 = 2").unwrap();
    let err = parse_expression(&tokens).unwrap_err();
    assert!(matches!(err, ParseError::InvalidAssignment { .. }));
}

#[test]
fn test_unary() {
    assert_eq!(expr("-1 + !x"), "(+ (- 1) (! x))");
    assert_eq!(expr("--2"), "(- (- 2))");
}

#[test]
fn test_literals() {
    assert_eq!(expr("1.5"), "1.5");
    assert_eq!(expr("\"a\\\"b\""), "\"a\\\"b\"");
    assert_eq!(expr("true"), "true");
    assert_eq!(expr("#12"), "#12");
    assert_eq!(expr("#-1"), "#-1");
}

#[test]
fn test_object_number_bounds() {
    assert_eq!(expr("#-2147483648"), "#-2147483648");
    assert_eq!(expr("#2147483647"), "#2147483647");
    for source in ["#2147483648", "#-2147483649"] {
        let tokens = lex(source).unwrap();
        assert!(
            matches!(parse_expression(&tokens), Err(ParseError::UnexpectedToken { .. })),
            "for source {:?}",
            source
        );
    }
}

#[test]
fn test_list_literal() {
    assert_eq!(expr("{}"), "(list)");
    assert_eq!(expr("{1, {2}, \"x\"}"), "(list 1 (list 2) \"x\")");
}

#[test]
fn test_range_literal() {
    assert_eq!(expr("[1..n + 1]"), "(range 1 (+ n 1))");
}

#[test]
fn test_function_calls() {
    assert_eq!(expr("typeof(1, x)"), "(call typeof 1 x)");
    assert_eq!(expr("(name)()"), "(call (group name))");
}

#[test]
fn test_verb_calls() {
    assert_eq!(expr("#1:look(2)"), "(verb #1 look 2)");
    assert_eq!(expr("$tell(\"hi\")"), "(verb #0 tell \"hi\")");
    assert_eq!(expr("x:a():b()"), "(verb (verb x a) b)");
}

#[test]
fn test_property_access() {
    assert_eq!(expr("#1.name"), "(. #1 name)");
    assert_eq!(expr("$root"), "(. #0 root)");
    assert_eq!(expr("x.a.b + 1"), "(+ (. (. x a) b) 1)");
}

#[test]
fn test_try_expression() {
    assert_eq!(expr("`1 / 0 ! E_DIV => 0'"), "(try (/ 1 0) [E_DIV] 0)");
    assert_eq!(expr("`x ! any => 1'"), "(try x [] 1)");
    assert_eq!(
        expr("`x ! E_TYPE, E_DIV => -1'"),
        "(try x [E_TYPE E_DIV] (- 1))"
    );
}

#[test]
fn test_expression_must_consume_input() {
    let tokens = lex("1 2").unwrap();
    assert!(matches!(
        parse_expression(&tokens),
        Err(ParseError::UnexpectedToken { .. })
    ));
}

// ==================== Statements ====================

#[test]
fn test_empty_program_is_zero() {
    let program = parse_source("");
    let [Stmt::ExprStmt { expr: Expr::Literal { value, .. } }] = statements(&program) else {
        panic!("Expected a single literal statement");
    };
    assert_eq!(*value, Value::Integer(0));
}

#[test]
fn test_comments_are_skipped() {
    let program = parse_source("// leading\n1; /* middle */ 2");
    assert_eq!(statements(&program).len(), 2);
}

#[test]
fn test_optional_semicolons() {
    let program = parse_source("x = 1; y = 2\nz = 3;;");
    assert_eq!(statements(&program).len(), 3);
}

#[test]
fn test_bare_return() {
    let program = parse_source("return;");
    let [Stmt::Return { expr, .. }] = statements(&program) else {
        panic!("Expected return");
    };
    assert_eq!(sexp(expr), "0");
}

#[test]
fn test_if_elseif_else() {
    let program = parse_source("if (a) 1; elseif (b) 2; elseif (c) 3; else 4; endif");
    let [Stmt::If { conditions, consequences, else_branch, .. }] = statements(&program) else {
        panic!("Expected if");
    };
    assert_eq!(conditions.iter().map(sexp).collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(consequences.len(), 3);
    assert!(else_branch.is_some());
}

#[test]
fn test_if_without_else() {
    let program = parse_source("if (x) endif");
    let [Stmt::If { consequences, else_branch, .. }] = statements(&program) else {
        panic!("Expected if");
    };
    assert_eq!(statements(&consequences[0]).len(), 1);
    assert!(else_branch.is_none());
}

#[test]
fn test_for_over_range_and_expression() {
    let program = parse_source("for i in [1..3] i; endfor for x in (xs) x; endfor");
    let [
        Stmt::For { loop_var: a, iterable: ra, .. },
        Stmt::For { loop_var: b, iterable: rb, .. },
    ] = statements(&program)
    else {
        panic!("Expected two for loops");
    };
    assert_eq!((a.as_str(), sexp(ra).as_str()), ("i", "(range 1 3)"));
    assert_eq!((b.as_str(), sexp(rb).as_str()), ("x", "xs"));
}

#[test]
fn test_for_requires_range_or_parens() {
    assert!(matches!(
        parse_err("for x in xs endfor"),
        ParseError::UnexpectedToken { .. }
    ));
}

#[test]
fn test_try_statement() {
    let program = parse_source(
        "try 1 / 0; except e (E_DIV, E_TYPE) e; except (any) 0; endtry",
    );
    let [Stmt::Try { handler_arms, .. }] = statements(&program) else {
        panic!("Expected try");
    };
    assert_eq!(handler_arms.len(), 2);
    assert_eq!(handler_arms[0].binding.as_deref(), Some("e"));
    assert_eq!(handler_arms[0].errors.len(), 2);
    assert_eq!(handler_arms[1].binding, None);
    assert!(handler_arms[1].errors.is_empty());
}

#[test]
fn test_try_requires_an_arm() {
    assert!(matches!(
        parse_err("try 1; endtry"),
        ParseError::UnexpectedToken { .. }
    ));
}

// ==================== Errors ====================

#[test]
fn test_missing_endif_reports_eof() {
    let err = parse_err("if (x)\n  1;");
    let ParseError::UnexpectedEof { expected, position, .. } = err else {
        panic!("Expected EOF error, got {:?}", err);
    };
    assert_eq!(expected, "'endif'");
    assert_eq!(position.line, 2);
}

#[test]
fn test_error_position_points_at_token() {
    let err = parse_err("x = 1;\ny = );");
    assert_eq!(err.position().line, 2);
    assert_eq!(err.position().column, 5);
}

#[test]
fn test_stray_block_terminator() {
    assert!(matches!(parse_err("1; endfor"), ParseError::UnexpectedToken { .. }));
}
