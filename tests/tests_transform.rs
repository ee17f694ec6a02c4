//! End-to-end transform tests: selector scoping, value substitution, and
//! keyframes renaming over in-memory projects.

mod helpers;

use helpers::{compile, compile_one};
use stylium::{DiagnosticCode, Severity};

#[test]
fn classes_scope_to_the_file_namespace() {
    let output = compile_one(".root {}\n.part { color: green; }");
    assert_eq!(
        output.css,
        ".entry__root {\n}\n.entry__part {\n    color: green;\n}\n"
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn namespace_at_rule_overrides_the_file_stem() {
    let output = compile_one("@namespace \"Button\";\n.root {}");
    assert_eq!(output.css, ".Button__root {\n}\n");
}

#[test]
fn imported_class_keeps_its_origin_namespace() {
    let output = compile(
        &[
            ("/mix.st.css", ".part { color: green; }"),
            (
                "/entry.st.css",
                ":import {\n    -st-from: \"./mix.st.css\";\n    -st-named: part;\n}\n\
                 .part { color: red; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(output.css, ".mix__part {\n    color: red;\n}\n");
    assert_eq!(output.exports.classes["part"], "mix__part");
}

#[test]
fn default_import_element_becomes_the_origin_root() {
    let output = compile(
        &[
            ("/button.st.css", ".root { color: green; }"),
            (
                "/entry.st.css",
                "@st-import Button from \"./button.st.css\";\nButton { color: red; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(output.css, ".button__root {\n    color: red;\n}\n");
}

#[test]
fn plain_tags_pass_through_untouched() {
    let output = compile_one("div { color: red; }\n.root:hover { color: blue; }");
    assert_eq!(
        output.css,
        "div {\n    color: red;\n}\n.entry__root:hover {\n    color: blue;\n}\n"
    );
}

#[test]
fn declared_states_scope_with_a_double_dash() {
    let output = compile_one(
        ".root { -st-states: loading, open; }\n\
         .root:loading { color: red; }\n\
         .root:open:hover { color: blue; }",
    );
    assert_eq!(
        output.css,
        ".entry__root {\n}\n\
         .entry__root.entry--loading {\n    color: red;\n}\n\
         .entry__root.entry--open:hover {\n    color: blue;\n}\n"
    );
}

#[test]
fn inherited_states_scope_to_their_declaring_file() {
    let output = compile(
        &[
            ("/button.st.css", ".root { -st-states: toggled; }"),
            (
                "/entry.st.css",
                ":import { -st-from: \"./button.st.css\"; -st-default: Button; }\n\
                 .root { -st-extends: Button; }\n\
                 .root:toggled { color: red; }",
            ),
        ],
        "/entry.st.css",
    );
    assert!(output.css.contains(".entry__root.button--toggled {\n    color: red;\n}\n"));
}

#[test]
fn custom_pseudo_element_reaches_into_the_extended_sheet() {
    let output = compile(
        &[
            ("/comp.st.css", ".root {}\n.part { color: green; }"),
            (
                "/entry.st.css",
                ":import { -st-from: \"./comp.st.css\"; -st-default: Comp; }\n\
                 .root { -st-extends: Comp; }\n\
                 .root::part { color: blue; }\n\
                 .root::before { content: \"x\"; }",
            ),
        ],
        "/entry.st.css",
    );
    assert!(output.css.contains(".entry__root .comp__part {\n    color: blue;\n}\n"));
    assert!(output.css.contains(".entry__root::before"));
}

#[test]
fn logical_pseudo_arguments_are_scoped() {
    let output = compile_one(":is(.a, .b) { color: red; }\n.root:not(.a) { color: blue; }");
    assert!(output.css.contains(":is(.entry__a, .entry__b)"));
    assert!(output.css.contains(".entry__root:not(.entry__a)"));
}

#[test]
fn keyframes_scope_and_animations_follow() {
    let output = compile_one(
        "@keyframes slide { from { margin: 0; } }\n.root { animation: slide 2s; }",
    );
    assert_eq!(
        output.css,
        "@keyframes entry__slide {\n    from {\n        margin: 0;\n    }\n}\n\
         .entry__root {\n    animation: entry__slide 2s;\n}\n"
    );
    assert_eq!(output.exports.keyframes["slide"], "entry__slide");
}

#[test]
fn keyframes_coexist_with_a_class_of_the_same_name() {
    let output = compile_one("@keyframes slide { from { margin: 0; } }\n.slide { color: red; }");
    assert!(output.css.contains("@keyframes entry__slide"));
    assert!(output.css.contains(".entry__slide {\n    color: red;\n}\n"));
}

#[test]
fn imported_keyframes_rename_to_their_origin() {
    let output = compile(
        &[
            ("/base.st.css", "@keyframes slide { from { margin: 0; } }"),
            (
                "/entry.st.css",
                "@st-import [keyframes(slide as s)] from \"./base.st.css\";\n\
                 .root { animation-name: s; }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(output.css, ".entry__root {\n    animation-name: base__slide;\n}\n");
    assert_eq!(output.exports.keyframes["s"], "base__slide");
}

#[test]
fn local_vars_substitute() {
    let output = compile_one(":vars { color1: green; }\n.root { color: value(color1); }");
    assert_eq!(output.css, ".entry__root {\n    color: green;\n}\n");
}

#[test]
fn imported_vars_evaluate_in_their_declaring_file() {
    let output = compile(
        &[
            (
                "/vars.st.css",
                ":vars { base: green; border1: 1px solid value(base); }",
            ),
            (
                "/entry.st.css",
                "@st-import [border1] from \"./vars.st.css\";\n\
                 .root { border: value(border1); }",
            ),
        ],
        "/entry.st.css",
    );
    assert_eq!(output.css, ".entry__root {\n    border: 1px solid green;\n}\n");
}

#[test]
fn typed_values_index_by_path() {
    let output = compile_one(
        ":vars { theme: st-map(primary green, sizes st-array(1px, 2px)); }\n\
         .root { color: value(theme, primary); border-width: value(theme, sizes, 1); }",
    );
    assert!(output.css.contains("color: green;"));
    assert!(output.css.contains("border-width: 2px;"));
    assert!(output.diagnostics.is_empty());
}

#[test]
fn legacy_box_aliases_still_work_but_warn() {
    let output = compile_one(":vars { list: stArray(a, b); }\n.root { color: value(list, 0); }");
    assert!(output.css.contains("color: a;"));
    let warning = output
        .diagnostics
        .iter()
        .find(|d| d.code == DiagnosticCode::DeprecatedAlias)
        .expect("expected a deprecation warning");
    assert_eq!(warning.severity, Severity::Warning);
    assert!(!output.diagnostics.has_errors());
}

#[test]
fn unknown_var_warns_and_keeps_the_text() {
    let output = compile_one(".root { color: value(missing); }");
    assert!(output.css.contains("color: value(missing);"));
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnknownVar));
    assert!(!output.diagnostics.has_errors());
}

#[test]
fn cyclic_vars_are_an_error() {
    let output = compile_one(
        ":vars { a: value(b); b: value(a); }\n.root { color: value(a); }",
    );
    assert!(output.diagnostics.has_errors());
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::InvalidArgument));
}

#[test]
fn indexing_a_plain_var_is_an_error() {
    let output = compile_one(":vars { plain: red; }\n.root { color: value(plain, 0); }");
    assert!(output.css.contains("color: value(plain, 0);"));
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::InvalidArgument));
}

#[test]
fn rules_inside_media_are_scoped() {
    let output = compile_one("@media screen {\n    .part { color: red; }\n}");
    assert_eq!(
        output.css,
        "@media screen {\n    .entry__part {\n        color: red;\n    }\n}\n"
    );
}

#[test]
fn definition_blocks_never_reach_the_output() {
    let output = compile(
        &[
            ("/mix.st.css", ".part {}"),
            (
                "/entry.st.css",
                ":import { -st-from: \"./mix.st.css\"; -st-named: part; }\n\
                 @st-import Mix from \"./mix.st.css\";\n\
                 :vars { color1: red; }\n\
                 .root { color: value(color1); }",
            ),
        ],
        "/entry.st.css",
    );
    assert!(!output.css.contains(":import"));
    assert!(!output.css.contains("st-import"));
    assert!(!output.css.contains(":vars"));
    assert_eq!(output.css, ".entry__root {\n    color: red;\n}\n");
}

#[test]
fn unresolved_import_is_an_error() {
    let output = compile_one(
        ":import { -st-from: \"./missing.st.css\"; -st-default: Gone; }\n.root {}",
    );
    assert!(output.diagnostics.iter().any(|d| d.code == DiagnosticCode::UnresolvedImport));
}

#[test]
fn missing_named_export_is_an_error() {
    let output = compile(
        &[
            ("/base.st.css", ".a {}"),
            (
                "/entry.st.css",
                ":import { -st-from: \"./base.st.css\"; -st-named: b; }\n.root {}",
            ),
        ],
        "/entry.st.css",
    );
    let error = output
        .diagnostics
        .errors()
        .find(|d| d.code == DiagnosticCode::UnresolvedImport)
        .expect("expected an unresolved import error");
    assert!(error.message.contains("`b`"));
}
