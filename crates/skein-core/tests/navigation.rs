//! Integration tests for skein-core navigation.

use std::sync::Arc;
use std::thread;

use insta::assert_snapshot;
use proptest::prelude::*;
use skein_core::{Context, ParseErrorKind, RuntimeError, Section, Session, Story, StoryError, load, parse};

const BRANCHES: &str = "\
Hello
* Opt A
  A content
* Opt B
  B content
- gather -> END
";

const TOWN: &str = "\
VAR coins = 3
== square
(top) You stand in the square. #outdoors
+ [Look around] You look around. -> top
* [Visit the baker] The baker waves. -> top
* {square.top > 2} [Leave town] You leave. -> END
";

fn start(story: &Story) -> (Section, Context) {
    story.resume(&Context::new(story)).unwrap()
}

#[test]
fn end_to_end_branch_and_gather() {
    let story = parse(BRANCHES).unwrap();
    let (first, ctx) = start(&story);
    assert_eq!(first.text, "Hello");
    assert_eq!(first.options, vec!["Opt A", "Opt B"]);
    assert!(!first.end);

    let (second, _) = story.pick(&ctx, 0).unwrap();
    assert!(second.text.contains("A content"));
    assert!(second.text.contains("gather"));
    assert!(second.end);
    assert_snapshot!(second.text, @r"
    Opt A
    A content
    gather
    ");
}

#[test]
fn both_branches_converge_on_the_gather() {
    let story = parse(BRANCHES).unwrap();
    let (_, ctx) = start(&story);
    for index in 0..2 {
        let (section, after) = story.pick(&ctx, index).unwrap();
        assert!(section.text.ends_with("gather"), "{}", section.text);
        assert_eq!(after.visits("start__i__c__g"), 1);
        assert_eq!(after.current, "end");
    }
}

#[test]
fn once_only_options_disappear_and_sticky_ones_stay() {
    let story = load(TOWN).unwrap();
    let (first, ctx) = start(&story);
    assert_eq!(first.options, vec!["Look around", "Visit the baker"]);

    let (after_baker, ctx) = story.pick(&ctx, 1).unwrap();
    assert_eq!(after_baker.text, "The baker waves.\nYou stand in the square.");
    assert_eq!(after_baker.options, vec!["Look around"]);

    let (after_look, _) = story.pick(&ctx, 0).unwrap();
    assert_eq!(after_look.options, vec!["Look around", "Leave town"]);
}

#[test]
fn condition_hides_option_until_visited() {
    let source = "\
-> hub
== hub
Where to?
* {cellar > 0} Open the chest -> END
+ [Go down] -> cellar
== cellar
Dusty. -> hub
";
    let story = load(source).unwrap();
    let (first, ctx) = start(&story);
    assert_eq!(first.options, vec!["Go down"]);
    let (second, ctx) = story.pick(&ctx, 0).unwrap();
    assert_eq!(second.text, "Dusty.\nWhere to?");
    assert_eq!(second.options, vec!["Open the chest", "Go down"]);
    let (last, _) = story.pick(&ctx, 0).unwrap();
    assert_eq!(last.text, "Open the chest");
    assert!(last.end);
}

#[test]
fn label_overrides_positional_path() {
    let source = "\
== meet
* (greet) Hello
  Nice to meet you. -> END
* Skip -> greet
";
    let story = load(source).unwrap();
    let greet = story.lookup("meet__greet").unwrap();
    let skip = story.lookup("meet__c__1").unwrap();
    assert_eq!(story.resolve_divert("greet", skip), Some(greet));
    assert!(story.lookup("meet__c__0").is_none());

    let (_, ctx) = start(&story);
    let (section, ctx) = story.pick(&ctx, 1).unwrap();
    assert_eq!(section.text, "Skip\nHello\nNice to meet you.");
    assert_eq!(ctx.visits("meet__greet"), 1);
}

#[test]
fn nesting_jump_fails_to_parse() {
    let err = parse("* depth one\n*** depth three").unwrap_err();
    assert_eq!(err.line, 2);
    assert!(matches!(err.kind, ParseErrorKind::IllegalNesting { depth: 3, .. }));
}

#[test]
fn glue_joins_without_separator() {
    let story = parse("We hurried home <>\n<>to Savile Row -> END").unwrap();
    assert_eq!(start(&story).0.text, "We hurried home to Savile Row");

    let story = parse("a line ending in a tail glue <>\n<> a leading-glue line -> END").unwrap();
    assert_eq!(
        start(&story).0.text,
        "a line ending in a tail glue a leading-glue line"
    );

    let story = parse("First line\nSecond line -> END").unwrap();
    assert_eq!(start(&story).0.text, "First line\nSecond line");
}

#[test]
fn knot_tags_come_before_line_tags() {
    let story = load(TOWN).unwrap();
    let (first, _) = start(&story);
    assert_eq!(first.tags, vec!["outdoors"]);

    let story = load("== hall\n# dim #cold\nA long hall. #echo -> END").unwrap();
    assert_eq!(start(&story).0.tags, vec!["dim", "cold", "echo"]);

    let story = load("== hall #dim // the long hall\n#cold\nA long hall. -> END").unwrap();
    let (section, _) = start(&story);
    assert_eq!(section.text, "A long hall.");
    assert_eq!(section.tags, vec!["dim", "cold"]);
}

#[test]
fn option_tags_are_listed() {
    let story = load("* Fight -> END #danger\n* Flee -> END").unwrap();
    let (section, _) = start(&story);
    assert_eq!(section.option_tags, vec![vec!["danger".to_string()], Vec::new()]);
}

#[test]
fn variables_feed_conditions() {
    let story = load("VAR brave = false\n* {brave} Charge -> END\n* {not brave} Hide -> END").unwrap();
    let (section, mut ctx) = start(&story);
    assert_eq!(section.options, vec!["Hide"]);

    ctx.current = "start__c".to_string();
    ctx.vars.insert("brave".to_string(), true.into());
    let (section, _) = story.resume(&ctx).unwrap();
    assert_eq!(section.options, vec!["Charge"]);
}

#[test]
fn load_reports_every_dead_end() {
    let err = load("* A\n  a\n* B\n  b").unwrap_err();
    let StoryError::Validation(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 2);
}

#[test]
fn runtime_failure_keeps_story_usable() {
    let story = parse("* Go -> nowhere\n* Stay -> END").unwrap();
    let (_, ctx) = start(&story);
    assert!(matches!(
        story.pick(&ctx, 0),
        Err(RuntimeError::UnresolvedDivert { .. })
    ));
    let (section, _) = story.pick(&ctx, 1).unwrap();
    assert!(section.end);
}

#[test]
fn shared_story_plays_concurrently() {
    let story = Arc::new(load(TOWN).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let story = Arc::clone(&story);
            thread::spawn(move || {
                let mut session = Session::new(&story);
                session.advance().unwrap();
                for _ in 0..n {
                    session.pick(0).unwrap();
                }
                session.context().visits("square__top")
            })
        })
        .collect();
    let counts: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
}

/// Play a sequence of picks, reducing each choice modulo the visible count.
fn play(story: &Story, picks: &[usize]) -> Vec<(Section, Context)> {
    let mut steps = Vec::new();
    let (mut section, mut ctx) = start(story);
    for pick in picks {
        if section.end {
            break;
        }
        let index = pick % section.options.len();
        let (next_section, next_ctx) = story.pick(&ctx, index).unwrap();
        steps.push((next_section.clone(), next_ctx.clone()));
        section = next_section;
        ctx = next_ctx;
    }
    steps
}

proptest! {
    #[test]
    fn reloaded_context_continues_identically(picks in prop::collection::vec(0usize..3, 1..12), next in 0usize..3) {
        let story = load(TOWN).unwrap();
        let steps = play(&story, &picks);
        let Some((section, ctx)) = steps.last() else {
            return Ok(());
        };
        prop_assume!(!section.end);

        let reloaded = Context::from_json(&ctx.to_json().unwrap()).unwrap();
        prop_assert_eq!(&reloaded, ctx);

        let index = next % section.options.len();
        let original = story.pick(ctx, index).unwrap();
        let replayed = story.pick(&reloaded, index).unwrap();
        prop_assert_eq!(original, replayed);
    }

    #[test]
    fn visit_counts_never_decrease(picks in prop::collection::vec(0usize..3, 1..12)) {
        let story = load(TOWN).unwrap();
        let (_, mut previous) = start(&story);
        for (section, ctx) in play(&story, &picks) {
            for (path, value) in &previous.vars {
                if let Some(before) = value.as_integer() {
                    prop_assert!(ctx.visits(path) >= before, "{} went down", path);
                }
            }
            if !section.end {
                prop_assert_eq!(ctx.visits("square__top__c"), previous.visits("square__top__c") + 1);
            }
            previous = ctx;
        }
    }
}
