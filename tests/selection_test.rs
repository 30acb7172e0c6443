mod common;

use common::{linear_chain, project, worked_example, ScriptedPrompter};
use django_setting::docker::select::{
    end_menu, parse_end_choice, select_end, select_options, select_start, select_sub_option,
    start_menu,
};
use django_setting::docker::{discover, EndPoint, StartPoint};
use django_setting::prompt::InputError;

#[test]
fn test_unique_sub_options_are_selected_without_prompting() {
    let (_workdir, layout) = project("demo");
    linear_chain(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    let prompter = ScriptedPrompter::new(&[]);

    select_options(&mut tree, &prompter).unwrap();

    assert!(tree.is_fully_selected());
    assert!(prompter.asked.borrow().is_empty());
    assert!(prompter.shown.borrow().is_empty());
}

#[test]
fn test_invalid_input_shows_the_same_menu_again() {
    let (_workdir, layout) = project("demo");
    worked_example(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    let prompter = ScriptedPrompter::new(&["abc", "3", "2"]);

    let option = tree.options_mut().nth(1).unwrap();
    let menu =
        "Category(02.extra)\n - Option(00)\n -- SubOption select:\n  1.debug\n  2.production";
    let selected = select_sub_option(option, &prompter).unwrap();

    assert_eq!(selected.title, "production");
    assert_eq!(prompter.shown_count(menu), 3);
    assert!(prompter.transcript().contains("  ! Input value error ('abc' is not a number)"));
    assert!(prompter
        .transcript()
        .contains("  ! Selected index is not valid (3 is not between 1 and 2)"));
    assert_eq!(prompter.remaining(), 0);
}

#[test]
fn test_failed_prompt_leaves_selection_untouched() {
    let (_workdir, layout) = project("demo");
    worked_example(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    // Script runs out after the invalid answer
    let prompter = ScriptedPrompter::new(&["abc"]);

    assert!(select_options(&mut tree, &prompter).is_err());
    let extra = tree.options().nth(1).unwrap();
    assert!(extra.selected_sub_option().is_none());
    assert!(!tree.is_fully_selected());
}

#[test]
fn test_start_menu_lists_root_then_layers() {
    let (_workdir, layout) = project("demo");
    linear_chain(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    select_options(&mut tree, &ScriptedPrompter::new(&[])).unwrap();
    let sequence = tree.resolved_sequence().unwrap();

    let menu = start_menu(&sequence, "python:3.11");
    assert_eq!(
        menu.render(),
        "Select start image:\n  0.python:3.11\n  1.app-os-00-slim\n  2.app-deps-00-pip\n  \
         3.app-app-00-run"
    );
    assert_eq!(menu.prompt(), "  > Select image number (default: 0.python:3.11)");
}

#[test]
fn test_end_menu_hides_layers_before_start() {
    let (_workdir, layout) = project("demo");
    linear_chain(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    select_options(&mut tree, &ScriptedPrompter::new(&[])).unwrap();
    let sequence = tree.resolved_sequence().unwrap();

    let menu = end_menu(&sequence, StartPoint::Layer(1));
    assert_eq!(menu.numbers(), vec![2, 3]);
    assert_eq!(menu.prompt(), "  > Select image number (default: 3.app-app-00-run)");
}

#[test]
fn test_parse_end_choice() {
    assert_eq!(parse_end_choice("", 0, 3), Ok(EndPoint { index: 2, production: true }));
    assert_eq!(parse_end_choice("3", 0, 3), Ok(EndPoint { index: 2, production: true }));
    assert_eq!(parse_end_choice("2", 1, 3), Ok(EndPoint { index: 1, production: false }));
    assert_eq!(
        parse_end_choice("1", 1, 3),
        Err(InputError::OutOfRange { value: 1, min: 2, max: 3 })
    );
    assert_eq!(parse_end_choice("", 0, 0), Err(InputError::Empty));
}

#[test]
fn test_select_start_and_end_defaults() {
    let (_workdir, layout) = project("demo");
    linear_chain(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    select_options(&mut tree, &ScriptedPrompter::new(&[])).unwrap();
    let sequence = tree.resolved_sequence().unwrap();

    let prompter = ScriptedPrompter::new(&["", ""]);
    let start = select_start(&prompter, &sequence, "python:3.11").unwrap();
    let end = select_end(&prompter, &sequence, start).unwrap();

    assert_eq!(start, StartPoint::Root);
    assert_eq!(end, EndPoint { index: 2, production: true });
}

#[test]
fn test_select_end_rejects_numbers_before_start() {
    let (_workdir, layout) = project("demo");
    linear_chain(&layout);
    let mut tree = discover(&layout.docker_dir, "app").unwrap();
    select_options(&mut tree, &ScriptedPrompter::new(&[])).unwrap();
    let sequence = tree.resolved_sequence().unwrap();

    let prompter = ScriptedPrompter::new(&["1", "2"]);
    let end = select_end(&prompter, &sequence, StartPoint::Layer(1)).unwrap();

    assert_eq!(end, EndPoint { index: 1, production: false });
    assert_eq!(prompter.remaining(), 0);
}
