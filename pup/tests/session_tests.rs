use pretty_assertions::assert_eq;
use pup::{Config, Environment, ErrorKind, Session, Value, evaluate_program, register_stdlib};

#[test]
fn test_definitions_persist_across_programs() {
    let session = Session::new();
    session.evaluate_program("(define base 10)").unwrap();
    session.evaluate_program("(define scale (x -> (* x base)))").unwrap();

    let outcomes = session.evaluate_program("(scale 4)").unwrap();
    assert_eq!(outcomes, vec![Ok(Some(Value::number(40)))]);
}

#[test]
fn test_errors_do_not_stop_later_expressions() {
    let session = Session::new();
    let outcomes = session
        .evaluate_program(
            "
            (define a 1)
            (/ a 0)
            (define a 2)
            (undefined 1)
            (+ a 1)
            ",
        )
        .unwrap();

    assert_eq!(outcomes.len(), 5);
    assert_eq!(outcomes[0], Ok(None));
    assert_eq!(outcomes[1].as_ref().unwrap_err().kind, ErrorKind::DivisionByZero);
    assert_eq!(outcomes[2].as_ref().unwrap_err().kind, ErrorKind::Redefinition);
    assert_eq!(outcomes[3].as_ref().unwrap_err().kind, ErrorKind::UnboundName);
    assert_eq!(outcomes[4], Ok(Some(Value::number(2))));
}

#[test]
fn test_failed_define_never_binds() {
    let session = Session::new();
    let outcomes = session.evaluate_program("(define broken (head [])) broken").unwrap();
    assert_eq!(outcomes[0].as_ref().unwrap_err().kind, ErrorKind::EmptyList);
    assert_eq!(outcomes[1].as_ref().unwrap_err().kind, ErrorKind::UnboundName);
}

#[test]
fn test_evaluate_program_with_caller_environment() {
    let env = Environment::new();
    register_stdlib(&env);
    let config = Config::default();

    let outcomes = evaluate_program("(define n 3) (to n)", &env, &config).unwrap();
    assert_eq!(outcomes[1].as_ref().unwrap().as_ref().unwrap().to_string(), "[0 1 2]");
    assert!(env.resolves(pup::Symbol::new("n")));
}

#[test]
fn test_bare_environment_has_no_stdlib() {
    let env = Environment::new();
    let outcomes = evaluate_program("(+ 1 2) 4", &env, &Config::default()).unwrap();
    assert_eq!(outcomes[0].as_ref().unwrap_err().kind, ErrorKind::UnboundName);
    assert_eq!(outcomes[1], Ok(Some(Value::number(4))));
}

#[test]
fn test_depth_budget_is_per_expression() {
    let session = Session::with_config(Config::default().with_max_depth(64));
    let nested = (0..20).fold(String::from("0"), |acc, _| format!("(+ 1 {acc})"));
    let program = format!("{nested} {nested} {nested}");

    let outcomes = session.evaluate_program(&program).unwrap();
    assert_eq!(outcomes.len(), 3);
    for outcome in outcomes {
        assert_eq!(outcome, Ok(Some(Value::number(20))));
    }
}

#[test]
fn test_multiline_program_with_comments() {
    let session = Session::new();
    let program = "
        ; square every number, then sum ;
        (define squares (map (x -> (* x x)) (to 4)))
        (fold + squares)
    ";
    let outcomes = session.evaluate_program(program).unwrap();
    assert_eq!(outcomes, vec![Ok(None), Ok(Some(Value::number(14)))]);
}
