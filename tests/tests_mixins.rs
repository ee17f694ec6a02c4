//! Mixin composition tests: inline splicing, sibling grafting, root mixins,
//! argument overrides, and function mixins.

mod helpers;

use std::path::Path;
use std::sync::Arc;

use helpers::{compile, compile_one, compiler};
use stylium::DiagnosticCode;

#[test]
fn local_class_mixin_inlines_declarations() {
    let output = compile_one(".mix { color: red; }\n.root { -st-mixin: mix; }");
    assert_eq!(
        output.css,
        ".entry__mix {\n    color: red;\n}\n.entry__root {\n    color: red;\n}\n"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn multiple_references_apply_in_order() {
    let output = compile_one(
        ".a { color: red; }\n.b { width: 1px; }\n.root { -st-mixin: a b; }",
    );
    assert_eq!(
        output.css,
        ".entry__a {\n    color: red;\n}\n\
         .entry__b {\n    width: 1px;\n}\n\
         .entry__root {\n    color: red;\n    width: 1px;\n}\n"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn mixin_pseudo_rules_become_siblings() {
    let output = compile_one(
        ".m { color: red; }\n.m:hover { color: blue; }\n.root { -st-mixin: m; }",
    );
    assert_eq!(
        output.css,
        ".entry__m {\n    color: red;\n}\n\
         .entry__m:hover {\n    color: blue;\n}\n\
         .entry__root {\n    color: red;\n}\n\
         .entry__root:hover {\n    color: blue;\n}\n"
    );
}

#[test]
fn cross_file_mixin_scopes_to_its_origin() {
    let output = compile(
        &[
            ("/mix.st.css", ".m { color: green; }\n.m .child { color: gold; }"),
            (
                "/entry.st.css",
                ":import { -st-from: \"./mix.st.css\"; -st-named: m; }\n\
                 .root { -st-mixin: m; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n    color: green;\n}\n\
         .entry__root .mix__child {\n    color: gold;\n}\n"
    );
}

#[test]
fn root_mixin_nests_foreign_rules() {
    let output = compile(
        &[
            ("/comp.st.css", ".root { color: red; }\n.part { color: blue; }"),
            (
                "/entry.st.css",
                "@st-import Comp from \"./comp.st.css\";\n.root { -st-mixin: Comp; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n    color: red;\n}\n\
         .entry__root .comp__part {\n    color: blue;\n}\n"
    );
}

#[test]
fn named_arguments_override_origin_vars() {
    let output = compile(
        &[
            (
                "/mix.st.css",
                ":vars { color1: red; width1: 1px; }\n\
                 .m { color: value(color1); width: value(width1); }",
            ),
            (
                "/entry.st.css",
                ":import { -st-from: \"./mix.st.css\"; -st-named: m; }\n\
                 .root { -st-mixin: m(color1 green); }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n    color: green;\n    width: 1px;\n}\n"
    );
}

#[test]
fn overrides_do_not_leak_into_later_applications() {
    let output = compile_one(
        ":vars { c: red; }\n\
         .m { color: value(c); }\n\
         .first { -st-mixin: m(c green); }\n\
         .second { -st-mixin: m; }",
    );
    assert_eq!(
        output.css,
        ".entry__m {\n    color: red;\n}\n\
         .entry__first {\n    color: green;\n}\n\
         .entry__second {\n    color: red;\n}\n"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn mixin_on_selector_list_grafts_each_target() {
    let output = compile_one(
        ".m { color: red; }\n.m:hover { color: blue; }\n.a, .b { -st-mixin: m; }",
    );
    assert_eq!(
        output.css,
        ".entry__m {\n    color: red;\n}\n\
         .entry__m:hover {\n    color: blue;\n}\n\
         .entry__a, .entry__b {\n    color: red;\n}\n\
         .entry__a:hover, .entry__b:hover {\n    color: blue;\n}\n"
    );
}

#[test]
fn mixed_in_copy_keeps_extends_and_drops_states() {
    let output = compile(
        &[
            ("/base.st.css", ".root {}"),
            (
                "/entry.st.css",
                "@st-import Base from \"./base.st.css\";\n\
                 .m { -st-extends: Base; -st-states: on; color: red; }\n\
                 .container { -st-mixin: m; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__m {\n    color: red;\n}\n\
         .entry__container {\n    -st-extends: Base;\n    color: red;\n}\n"
    );
}

#[test]
fn later_mixin_declaration_wins_with_a_warning() {
    let output = compile_one(
        ".a { color: red; }\n.b { color: blue; }\n\
         .root { -st-mixin: a; -st-mixin: b; }",
    );
    assert_eq!(
        output.css,
        ".entry__a {\n    color: red;\n}\n\
         .entry__b {\n    color: blue;\n}\n\
         .entry__root {\n    color: blue;\n}\n"
    );
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::OverrideMixin));
    assert!(!output.diagnostics.has_errors());
}

#[test]
fn circular_mixins_truncate_silently() {
    let output = compile_one(
        ".x { -st-mixin: y; color: red; }\n.y { -st-mixin: x; }",
    );
    assert_eq!(
        output.css,
        ".entry__x {\n    color: red;\n    color: red;\n}\n\
         .entry__y {\n    color: red;\n}\n"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn mixin_urls_rebase_to_the_consumer_directory() {
    let output = compile(
        &[
            ("/a/mix.st.css", ".m { background: url(./asset.png); }"),
            (
                "/entry.st.css",
                ":import { -st-from: \"./a/mix.st.css\"; -st-named: m; }\n\
                 .root { -st-mixin: m; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n    background: url(./a/asset.png);\n}\n"
    );
}

#[test]
fn root_mixin_duplicates_origin_keyframes() {
    let output = compile(
        &[
            (
                "/comp.st.css",
                "@keyframes spin { from { margin: 0; } }\n.root { animation: spin 1s; }",
            ),
            (
                "/entry.st.css",
                "@st-import Comp from \"./comp.st.css\";\n.root { -st-mixin: Comp; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n    animation: comp__spin 1s;\n}\n\
         @keyframes comp__spin {\n    from {\n        margin: 0;\n    }\n}\n"
    );
}

#[test]
fn reachable_keyframes_are_not_duplicated() {
    let output = compile(
        &[
            (
                "/comp.st.css",
                "@keyframes spin { from { margin: 0; } }\n.root { animation: spin 1s; }",
            ),
            (
                "/entry.st.css",
                "@st-import Comp, [keyframes(spin)] from \"./comp.st.css\";\n\
                 .root { -st-mixin: Comp; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(output.css, ".entry__root {\n    animation: comp__spin 1s;\n}\n");
    assert!(!output.css.contains("@keyframes"));
    assert_eq!(output.exports.keyframes["spin"], "comp__spin");
}

#[test]
fn alias_chains_apply_the_base_first() {
    let output = compile(
        &[
            ("/base.st.css", ".x { color: red; }"),
            (
                "/mid.st.css",
                ":import { -st-from: \"./base.st.css\"; -st-named: x; }\n\
                 .x { border: 1px; }",
            ),
            (
                "/entry.st.css",
                ":import { -st-from: \"./mid.st.css\"; -st-named: x; }\n\
                 .root { -st-mixin: x; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n    color: red;\n    border: 1px;\n}\n"
    );
}

#[test]
fn mixins_apply_inside_media_bodies() {
    let output = compile_one(
        ".m { color: red; }\n.m:hover { color: blue; }\n\
         @media screen { .root { -st-mixin: m; } }",
    );
    assert!(output.css.contains(
        "@media screen {\n    .entry__root {\n        color: red;\n    }\n    \
         .entry__root:hover {\n        color: blue;\n    }\n}\n"
    ));
}

#[test]
fn function_mixins_inline_their_declarations() {
    let compiler = compiler(&[(
        "/entry.st.css",
        ":import { -st-from: \"./mixins.js\"; -st-named: bg; }\n\
         .root { -st-mixin: bg(red, blue); }",
    )]);
    compiler.functions().register(
        "./mixins.js",
        "bg",
        Arc::new(|args: &[String]| Ok(vec![("background".to_string(), args.join(" "))])),
    );

    let output = compiler.compile(Path::new("/entry.st.css")).unwrap();
    assert_eq!(output.css, ".entry__root {\n    background: red blue;\n}\n");
    assert!(output.diagnostics.is_empty());
}

#[test]
fn failing_function_mixin_diagnoses() {
    let compiler = compiler(&[(
        "/entry.st.css",
        ":import { -st-from: \"./mixins.js\"; -st-named: bad; }\n\
         .root { -st-mixin: bad(); }",
    )]);
    compiler.functions().register(
        "./mixins.js",
        "bad",
        Arc::new(|_: &[String]| Err("needs at least one argument".to_string())),
    );

    let output = compiler.compile(Path::new("/entry.st.css")).unwrap();
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::InvalidArgument));
    assert_eq!(output.css, ".entry__root {\n}\n");
}

#[test]
fn unknown_mixin_diagnoses() {
    let output = compile_one(".root { -st-mixin: nope; }");
    assert_eq!(output.css, ".entry__root {\n}\n");
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnknownMixin));
}
