//! Embeds and `@Body`

use super::helpers::{marker_config, person};
use super::*;
use crate::registry::{EmbedState, RegistryError};
use crate::respond::StringRespond;
use crate::widget::{RenderError, MAX_EMBED_DEPTH};
use serde_json::json;

fn compile_with(registry: &WidgetRegistry, template: &str) -> Chain {
    TemplateCompiler::new(registry)
        .compile(template, &Shape::infer(&person()))
        .unwrap_or_else(|e| panic!("template should compile: {}", e))
}

fn bind(registry: &WidgetRegistry, name: &str, template: &str) {
    let chain = TemplateCompiler::new(registry)
        .compile(template, &Shape::Any)
        .unwrap_or_else(|e| panic!("embed should compile: {}", e));
    registry.bind_embed(name, chain).unwrap();
}

#[test]
fn test_unresolved_embed_fails_then_renders_after_binding() {
    let registry = WidgetRegistry::new();
    registry.add_embed("myfave").unwrap();
    let chain = compile_with(
        &registry,
        "<xml><div class='content'>hello @MyFave(should=false)<a href='/hi/${id}'>hideme</a></div></xml>",
    );

    let mut respond = StringRespond::new();
    let err = chain.render(&person(), &mut respond).unwrap_err();
    assert_eq!(
        err,
        RenderError::UnresolvedEmbed {
            name: "myfave".to_string()
        }
    );
    // output before the embed stays in the sink
    assert_eq!(respond.as_str(), r#"<xml><div class="content">hello "#);

    registry.bind_embed("myfave", Chain::Terminal).unwrap();
    assert_eq!(
        chain.render_to_string(&person()).unwrap(),
        r#"<xml><div class="content">hello </div></xml>"#
    );
}

#[test]
fn test_embed_slot_is_two_phase() {
    let registry = WidgetRegistry::new();
    let slot = registry.add_embed("Card").unwrap();
    assert!(matches!(slot.state(), EmbedState::Pending("card")));

    registry.bind_embed("card", Chain::Terminal).unwrap();
    assert!(matches!(slot.state(), EmbedState::Resolved(chain) if chain.is_terminal()));
    assert_eq!(
        registry.bind_embed("card", Chain::Terminal),
        Err(RegistryError::AlreadyBound {
            name: "card".to_string()
        })
    );
}

#[test]
fn test_embed_bindings_are_evaluated_against_caller() {
    let registry = WidgetRegistry::new();
    registry.add_embed("fave").unwrap();
    bind(&registry, "fave", "<span class='fave'>${label}</span>");

    let chain = compile_with(&registry, "<p>@Fave(label=name + '!')<i/></p>");
    assert_eq!(
        chain.render_to_string(&person()).unwrap(),
        r#"<p><span class="fave">Dhanji!</span></p>"#
    );
}

#[test]
fn test_embed_sees_caller_data_and_bindings_shadow_it() {
    let registry = WidgetRegistry::new();
    registry.add_embed("who").unwrap();
    bind(&registry, "who", "<b>${name}/${id}</b>");

    let chain = compile_with(&registry, "<p>@Who<i/> @Who(name='other')<i/></p>");
    assert_eq!(
        chain.render_to_string(&person()).unwrap(),
        "<p><b>Dhanji/12</b> <b>other/12</b></p>"
    );
}

#[test]
fn test_body_renders_caller_element_with_caller_data() {
    let registry = WidgetRegistry::new();
    registry.add_embed("card").unwrap();
    bind(
        &registry,
        "card",
        "<div class='card' title='${title}'>@Body<em>no body</em></div>",
    );

    let chain = compile_with(&registry, "<p>@Card(title='T', name='shadowed')<b>${name}</b></p>");
    assert_eq!(
        chain.render_to_string(&person()).unwrap(),
        r#"<p><div class="card" title="T"><b>Dhanji</b></div></p>"#
    );

    let slot = registry.embed_slot("card").unwrap();
    let card = slot.chain().unwrap();
    assert_eq!(
        card.render_to_string(&json!({ "title": "solo" })).unwrap(),
        r#"<div class="card" title="solo"><em>no body</em></div>"#
    );
}

#[test]
fn test_nested_embeds_pass_bodies_through() {
    let registry = WidgetRegistry::new();
    registry.add_embed("inner").unwrap();
    registry.add_embed("outer").unwrap();
    bind(&registry, "inner", "<i>@Body<x/></i>");
    bind(&registry, "outer", "<o>@Inner<y>@Body<z/></y></o>");

    let chain = compile_with(&registry, "<p>@Outer<b>${name}</b></p>");
    assert_eq!(
        chain.render_to_string(&person()).unwrap(),
        "<p><o><i><y><b>Dhanji</b></y></i></o></p>"
    );
}

#[test]
fn test_require_is_shared_with_embedded_chains() {
    let registry = WidgetRegistry::new();
    registry.add_embed("widget").unwrap();
    bind(&registry, "widget", "<w>@Require<script src='w.js'></script></w>");

    let chain = compile_with(
        &registry,
        "<p>@Require<script src='w.js'></script>@Widget<i/>@Widget<i/></p>",
    );
    assert_eq!(
        chain.render_to_string(&person()).unwrap(),
        r#"<p><script src="w.js"></script><w></w><w></w></p>"#
    );
}

#[test]
fn test_self_embedding_hits_depth_limit() {
    let registry = WidgetRegistry::new();
    registry.add_embed("again").unwrap();
    bind(&registry, "again", "<b>@Again<i/></b>");

    let chain = compile_with(&registry, "<p>@Again<i/></p>");
    assert_eq!(
        chain.render_to_string(&person()).unwrap_err(),
        RenderError::EmbedDepthExceeded {
            name: "again".to_string(),
            limit: MAX_EMBED_DEPTH
        }
    );
}

#[test]
fn test_failed_binding_is_handled_by_policy() {
    let registry = WidgetRegistry::new();
    registry.add_embed("show").unwrap();
    bind(&registry, "show", "<s>[${value}]</s>");

    let chain = TemplateCompiler::new(&registry)
        .with_config(marker_config())
        .compile("<p>@Show(value=missing.deep)<i/></p>", &Shape::Any)
        .unwrap();
    assert_eq!(
        chain.render_to_string(&json!({})).unwrap(),
        "<p><!--eval-error: missing.deep: property 'missing.deep' not found--><s>[]</s></p>"
    );
}

#[test]
fn test_embed_binding_expression_is_checked() {
    let registry = WidgetRegistry::new();
    registry.add_embed("fave").unwrap();
    let err = TemplateCompiler::new(&registry)
        .compile("<p>@Fave(label=nosuch)<i/></p>", &Shape::infer(&person()))
        .unwrap_err();
    assert!(matches!(err, TemplateCompileError::Expression { .. }), "{}", err);
    assert_eq!(err.fragment(), "@Fave(label=nosuch)");
}
