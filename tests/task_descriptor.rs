// tests/task_descriptor.rs

use devloop::errors::DevloopError;
use devloop::task::{render_display, Invocation, TaskDescriptor, Vars};
use proptest::prelude::*;

fn vars(pairs: &[(&str, &str)]) -> Vars {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn splits_program_and_args() {
    let inv = Invocation::parse("cargo run --bin server -- --port 8080").unwrap();
    assert_eq!(inv.program, "cargo");
    assert_eq!(inv.args, vec!["run", "--bin", "server", "--", "--port", "8080"]);
}

#[test]
fn quoted_words_stay_together() {
    let inv = Invocation::parse(r#"sh -c "echo hello world""#).unwrap();
    assert_eq!(inv.program, "sh");
    assert_eq!(inv.args, vec!["-c", "echo hello world"]);
}

#[test]
fn empty_and_unbalanced_descriptors_are_rejected() {
    assert!(matches!(
        Invocation::parse(""),
        Err(DevloopError::InvalidTask(_))
    ));
    assert!(matches!(
        Invocation::parse("   "),
        Err(DevloopError::InvalidTask(_))
    ));
    assert!(matches!(
        Invocation::parse("echo 'unterminated"),
        Err(DevloopError::InvalidTask(_))
    ));
}

#[test]
fn display_substitutes_both_variable_forms() {
    let v = vars(&[("app", "blog"), ("port", "8080")]);
    assert_eq!(
        render_display("./bin/${app} --port $port", &v),
        "./bin/blog --port 8080"
    );
}

#[test]
fn unknown_variables_are_kept_verbatim() {
    let v = vars(&[("app", "blog")]);
    assert_eq!(render_display("run $app $missing ${other}", &v), "run blog $missing ${other}");
}

#[test]
fn display_never_changes_the_invocation() {
    let v = vars(&[("app", "blog")]);
    let task = TaskDescriptor::new("./bin/$app serve", &v);

    assert_eq!(task.display(), "./bin/blog serve");
    assert_eq!(task.raw(), "./bin/$app serve");

    let inv = task.invocation().unwrap();
    assert_eq!(inv.program, "./bin/$app");
    assert_eq!(inv.args, vec!["serve"]);
}

#[test]
fn plain_descriptor_displays_raw_string() {
    let task = TaskDescriptor::plain("echo $HOME");
    assert_eq!(task.display(), "echo $HOME");
    assert_eq!(task.to_string(), "echo $HOME");
}

proptest! {
    #[test]
    fn invocation_is_independent_of_vars(value in "[a-zA-Z0-9 _./-]{0,24}") {
        let raw = "server --name $name --dir ${dir}";
        let with_vars = TaskDescriptor::new(raw, &vars(&[("name", value.as_str()), ("dir", value.as_str())]));
        let without = TaskDescriptor::plain(raw);

        prop_assert_eq!(with_vars.invocation().unwrap(), without.invocation().unwrap());
    }
}
