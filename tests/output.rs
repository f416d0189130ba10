use tapestry::output::HumanOutput;

#[test]
fn human_output_renders_fields_lines_and_hints() {
    let mut human = HumanOutput::new("tapestry init: initialized");
    human.field("data dir", "/tmp/tapestry");
    human.line("🌅 Morning (0)");
    human.hint("tapestry task ls");

    let rendered = human.to_string();
    assert_eq!(
        rendered,
        "tapestry init: initialized\n  data dir: /tmp/tapestry\n  🌅 Morning (0)\nnext: tapestry task ls"
    );
}

#[test]
fn title_alone_renders_one_line() {
    let human = HumanOutput::new("tapestry init: nothing to do");
    assert_eq!(human.to_string(), "tapestry init: nothing to do");
}

#[test]
fn empty_field_values_render_as_bare_keys() {
    let mut human = HumanOutput::new("tapestry stats");
    human.field("no records", "");
    assert_eq!(human.to_string(), "tapestry stats\n  no records");
}
