//! End-to-end rendering of templates, data and config read from disk

use std::fs;
use trellis_core::expr::toml_to_json;
use trellis_core::{
    Config, EvaluationPolicy, Shape, TemplateCompiler, TrellisError, WidgetRegistry,
    CONFIG_FILE_NAME,
};
use trellis_testkit::{SiteFixture, PERSON, SHOWCASE_TEMPLATE};

#[test]
fn test_showcase_renders_against_person() {
    let registry = WidgetRegistry::new();
    let chain = TemplateCompiler::new(&registry)
        .compile(SHOWCASE_TEMPLATE, &Shape::infer(&PERSON))
        .unwrap();

    assert_eq!(
        chain.render_to_string(&*PERSON).unwrap(),
        "<html>\n<head>\n  <link rel=\"stylesheet\" href=\"site.css\">\n</head>\n\
         <body class=\"content\">\n  <h1>Hello DHANJI</h1>\n  \n  \
         <ul><li>0:rust</li><li>1:web</li></ul>\n</body>\n</html>"
    );
}

#[test]
fn test_site_with_config_embeds_and_toml_data() {
    let site = SiteFixture::new()
        .config(
            r#"
[render]
on_evaluation_error = "marker"

[directives]
when = "showif"
fave = "myfave"

[embeds]
myfave = "embeds/fave.html"
"#,
        )
        .template("embeds/fave.html", "<em>${label}</em>@Body<i>none</i>")
        .template(
            "page.html",
            "<div>@When(user.admin)<b>hi ${user.name}</b>@Fave(label=user.name)<u>!</u></div>",
        )
        .file(
            "data.toml",
            "[user]\nname = \"Dhanji\"\nadmin = true\njoined = 2026-01-15\n",
        );

    let config = Config::from_file(site.path(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(config.render.on_evaluation_error, EvaluationPolicy::Marker);

    let registry = WidgetRegistry::new();
    config.configure(&registry).unwrap();
    assert_eq!(registry.pending_embeds(), vec!["myfave"]);

    let compiler = TemplateCompiler::new(&registry).with_config(config.render);
    for (name, relative) in &config.embeds {
        let markup = fs::read_to_string(site.root().join(relative)).unwrap();
        let chain = compiler.compile(&markup, &Shape::Any).unwrap();
        registry.bind_embed(name, chain).unwrap();
    }
    assert!(registry.pending_embeds().is_empty());

    let raw: toml::Value = toml::from_str(&fs::read_to_string(site.path("data.toml")).unwrap())
        .unwrap();
    let data = toml_to_json(&raw);
    assert_eq!(data["user"]["joined"], "2026-01-15");

    let page = compiler
        .compile(
            &fs::read_to_string(site.path("page.html")).unwrap(),
            &Shape::infer(&data),
        )
        .unwrap();
    assert_eq!(
        page.render_to_string(&data).unwrap(),
        "<div><b>hi Dhanji</b><em>Dhanji</em><u>!</u></div>"
    );
}

#[test]
fn test_config_with_unknown_alias_target_is_rejected() {
    let config = Config::parse("[directives]\nwhen = \"nosuch\"\n").unwrap();
    let err = config.configure(&WidgetRegistry::new()).unwrap_err();
    match err {
        TrellisError::ConfigInvalidValue { field, .. } => assert_eq!(field, "directives.when"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_missing_config_file_is_io_error() {
    let site = SiteFixture::new();
    let err = Config::from_file(site.path(CONFIG_FILE_NAME)).unwrap_err();
    assert!(matches!(err, TrellisError::IoError(_)));
    assert!(err.to_string().starts_with("IO_ERROR"), "{}", err);
}

#[test]
fn test_compile_errors_convert_into_crate_error() {
    let registry = WidgetRegistry::new();
    let result: trellis_core::Result<_> = TemplateCompiler::new(&registry)
        .compile("<p>${nosuch}</p>", &Shape::infer(&PERSON))
        .map_err(TrellisError::from);
    let message = result.unwrap_err().to_string();
    assert!(message.starts_with("TEMPLATE_COMPILE: line 1:"), "{}", message);
    assert!(message.contains("nosuch"), "{}", message);
}
