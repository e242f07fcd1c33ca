//! Literal markup, interpolation and conditionals

use super::helpers::{compile, marker_config, person, render, render_with};
use super::*;
use serde_json::{json, Value};

#[test]
fn test_show_if_true_renders_element() {
    assert_eq!(
        render("<xml>@ShowIf(true)<p>hello</p></xml>", &Value::Null),
        "<xml><p>hello</p></xml>"
    );
}

#[test]
fn test_show_if_false_renders_nothing() {
    assert_eq!(
        render("<xml>@ShowIf(false)<p>hello</p></xml>", &Value::Null),
        "<xml></xml>"
    );
}

#[test]
fn test_show_if_with_various_true_expressions() {
    for expression in [
        "true",
        "'x' == 'x'",
        "\"x\" == \"x\"",
        "'hello' instanceof string",
        "true; return true",
        " 5 >= 2 ",
    ] {
        let template = format!("<xml>@ShowIf({})<p>hello</p></xml>", expression);
        assert_eq!(
            render(&template, &Value::Null),
            "<xml><p>hello</p></xml>",
            "expression {:?}",
            expression
        );
    }
}

#[test]
fn test_interpolation_normalises_quotes() {
    assert_eq!(
        render(
            "<div class='${clazz}'>hello <a href='/people/${id}'>${name}</a></div>",
            &person()
        ),
        r#"<div class="content">hello <a href="/people/12">Dhanji</a></div>"#
    );
}

#[test]
fn test_hidden_child_keeps_leading_text() {
    assert_eq!(
        render(
            "<xml><div class='${clazz}'>hello @ShowIf(false)<a href='/hi/${id}'>hideme</a></div></xml>",
            &person()
        ),
        r#"<xml><div class="content">hello </div></xml>"#
    );
}

#[test]
fn test_whitespace_between_directive_and_element_is_dropped() {
    assert_eq!(
        render("<p>a @ShowIf(true)\n   <b>x</b> z</p>", &Value::Null),
        "<p>a <b>x</b> z</p>"
    );
}

#[test]
fn test_directive_keys_are_case_insensitive() {
    for key in ["ShowIf", "showif", "SHOWIF", "sHoWiF"] {
        let template = format!("<p>@{}(false)<b>x</b></p>", key);
        assert_eq!(render(&template, &Value::Null), "<p></p>");
    }
}

#[test]
fn test_conditional_reads_backing_data() {
    let data = json!({ "admin": true, "guest": false, "count": 3 });
    let template = "<ul>@ShowIf(admin)<li>a</li>@ShowIf(guest)<li>g</li>@ShowIf(count > 2)<li>c</li></ul>";
    assert_eq!(render(template, &data), "<ul><li>a</li><li>c</li></ul>");
}

#[test]
fn test_nested_conditionals() {
    let data = json!({ "outer": true, "inner": false });
    let template = "<a>@ShowIf(outer)<b>1 @ShowIf(inner)<c>2</c>3</b></a>";
    assert_eq!(render(template, &data), "<a><b>1 3</b></a>");
}

#[test]
fn test_round_trip_without_directives() {
    let template = concat!(
        "<!DOCTYPE html>\n",
        "<html lang=\"en\">\n",
        "  <!-- a comment with <tags> -->\n",
        "  <head><meta charset=\"utf-8\"><title>T</title>\n",
        "    <style>p > a { color: red; }</style>\n",
        "    <script>if (a < b && c) { run(`${x}`); }</script>\n",
        "  </head>\n",
        "  <BODY class=\"main\" data-x=raw disabled>\n",
        "    <p>1 < 2, email me@example.com</p><br/><img src=\"a.png\">\n",
        "    <![CDATA[ <not markup> ]]>\n",
        "  </body>\n",
        "</html>\n",
    );
    assert_eq!(render(template, &Value::Null), template);
}

#[test]
fn test_empty_document_is_terminal() {
    let chain = compile("").unwrap();
    assert!(chain.is_terminal());
    assert_eq!(chain.render_to_string(&Value::Null).unwrap(), "");
}

#[test]
fn test_single_quoted_value_with_double_quote_is_escaped() {
    assert_eq!(
        render(r#"<a title='say "hi"'>x</a>"#, &Value::Null),
        r#"<a title="say &quot;hi&quot;">x</a>"#
    );
}

#[test]
fn test_null_interpolation_is_empty() {
    let data = json!({ "nickname": null, "name": "x" });
    assert_eq!(render("<p>[${nickname}]</p>", &data), "<p>[]</p>");
}

#[test]
fn test_interpolation_formats_values() {
    let data = json!({ "n": 3, "f": 2.5, "b": false });
    assert_eq!(
        render("<p>${n + 1} ${f * 2} ${b} ${'lit'}</p>", &data),
        "<p>4 5 false lit</p>"
    );
}

#[test]
fn test_escapes_produce_literals() {
    let data = json!({ "name": "x" });
    assert_eq!(
        render(r"<p>\${name} \@ShowIf(false)<b>kept</b></p>", &data),
        "<p>${name} @ShowIf(false)<b>kept</b></p>"
    );
}

#[test]
fn test_unknown_word_in_running_text_is_literal() {
    assert_eq!(
        render("<p>mail @someone today</p><p>user@example.com<b>x</b></p>", &Value::Null),
        "<p>mail @someone today</p><p>user@example.com<b>x</b></p>"
    );
}

#[test]
fn test_missing_property_suppressed_by_default() {
    let shape = Shape::object([("name", Shape::String), ("admin", Shape::Bool)]);
    let chain = TemplateCompiler::new(&WidgetRegistry::new())
        .compile("<p>${name}| @ShowIf(admin)<b>x</b>|</p>", &shape)
        .unwrap();
    assert_eq!(chain.render_to_string(&json!({})).unwrap(), "<p>| |</p>");
}

#[test]
fn test_missing_property_marker_policy() {
    let shape = Shape::object([("name", Shape::String), ("admin", Shape::Bool)]);
    let chain = TemplateCompiler::new(&WidgetRegistry::new())
        .with_config(marker_config())
        .compile("<p>${name}| @ShowIf(admin)<b>x</b></p>", &shape)
        .unwrap();
    assert_eq!(
        chain.render_to_string(&json!({})).unwrap(),
        "<p><!--eval-error: name: property 'name' not found-->| <!--eval-error: admin: property 'admin' not found--></p>"
    );
}

#[test]
fn test_non_boolean_condition_at_runtime_is_evaluation_error() {
    let data = json!({ "flag": "yes" });
    let chain = TemplateCompiler::new(&WidgetRegistry::new())
        .with_config(marker_config())
        .compile("<p>@ShowIf(flag)<b>x</b></p>", &Shape::Any)
        .unwrap();
    assert_eq!(
        chain.render_to_string(&data).unwrap(),
        "<p><!--eval-error: flag: type mismatch: expected boolean, found string--></p>"
    );
}

#[test]
fn test_failure_does_not_abort_siblings() {
    let data = json!({ "items": [1], "name": "n" });
    assert_eq!(
        render_with(
            &WidgetRegistry::new(),
            RenderConfig::default(),
            "<p>${items.0.toString()} ${items.5} ${name}</p>",
            &data
        ),
        "<p>1  n</p>"
    );
}

#[test]
fn test_alias_directive() {
    let registry = WidgetRegistry::new();
    registry.alias("when", "showif").unwrap();
    assert_eq!(
        render_with(
            &registry,
            RenderConfig::default(),
            "<p>@When(false)<b>x</b>@when(true)<i>y</i></p>",
            &Value::Null
        ),
        "<p><i>y</i></p>"
    );
}

#[test]
fn test_adjacent_text_is_merged() {
    let chain = compile("<p>a<!--c-->b</p>").unwrap();
    assert_eq!(chain.widgets().len(), 1);
}
