#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]

use crate::{scan_bytes, scan_str, ScanFlags, ScanMode, ScanOptions, ScanOutput};
use pretty_assertions::assert_eq;

fn scan(source: &str) -> ScanOutput {
    scan_str(source).expect("test sources fit in u32")
}

fn scan_with(source: &str, options: &ScanOptions) -> ScanOutput {
    scan_bytes(source.as_bytes(), options).expect("test sources fit in u32")
}

const EMPTY: [&str; 0] = [];

// === Pattern family 1: exports.name = ===

#[test]
fn basic_property_assignment() {
    let out = scan("exports.foo = 1; exports.bar = function () {};");
    assert_eq!(out.exports, ["foo", "bar"]);
    assert_eq!(out.reexports, EMPTY);
    assert!(out.is_complete());
}

#[test]
fn chained_assignment_records_both() {
    let out = scan("exports.a = exports.b = 1;");
    assert_eq!(out.exports, ["a", "b"]);
}

#[test]
fn bare_exports_assignment_is_not_an_export() {
    // Rebinding the local `exports` variable exports nothing.
    assert_eq!(scan("exports = { a: 1 };").exports, EMPTY);
}

#[test]
fn subproperty_assignment_is_not_an_export() {
    assert_eq!(scan("exports.config.debug = true;").exports, EMPTY);
}

#[test]
fn compound_assignment_does_not_match() {
    assert_eq!(scan("exports.n += 1;").exports, EMPTY);
    assert_eq!(scan("exports.n == 1;").exports, EMPTY);
    assert_eq!(scan("exports.n === 1;").exports, EMPTY);
}

#[test]
fn member_position_exports_is_some_other_object() {
    assert_eq!(scan("config.exports.foo = 1;").exports, EMPTY);
}

#[test]
fn keyword_named_export() {
    assert_eq!(scan("exports.default = impl;").exports, ["default"]);
}

// === Pattern family 2: exports["name"] = ===

#[test]
fn computed_string_key() {
    let out = scan(r#"exports["dashed-name"] = 1; exports['single'] = 2;"#);
    assert_eq!(out.exports, ["dashed-name", "single"]);
}

#[test]
fn computed_dynamic_key_is_skipped() {
    assert_eq!(scan("exports[key] = 1;").exports, EMPTY);
    assert_eq!(scan("exports[`t`] = 1;").exports, EMPTY);
}

// === Pattern family 3: module.exports = { ... } ===

#[test]
fn object_literal_module_exports() {
    let out = scan("module.exports = { a: 1, b, c: function () {} };");
    assert_eq!(out.exports, ["a", "b", "c"]);
}

#[test]
fn object_literal_key_variety() {
    let out = scan(
        r#"module.exports = {
            plain: 1,
            "quoted": 2,
            'single-quoted': 3,
            shorthand,
            method() { return 1; },
            get accessor() { return 2; },
            set accessor(v) {},
            async_like: async () => 1,
        };"#,
    );
    assert_eq!(
        out.exports,
        ["plain", "quoted", "single-quoted", "shorthand", "method", "accessor", "async_like"]
    );
}

#[test]
fn object_literal_skips_unrecordable_keys() {
    let out = scan("module.exports = { [computed]: 1, 42: x, ok: 2 };");
    assert_eq!(out.exports, ["ok"]);
}

#[test]
fn object_literal_nested_values_do_not_leak() {
    let out = scan("module.exports = { outer: { inner: 1, deep: { deeper: 2 } }, next: 3 };");
    assert_eq!(out.exports, ["outer", "next"]);
}

#[test]
fn object_literal_values_with_commas_do_not_split() {
    let out = scan("module.exports = { f: g(1, 2), arr: [1, 2, 3], next: 1 };");
    assert_eq!(out.exports, ["f", "arr", "next"]);
}

#[test]
fn object_literal_trailing_comma() {
    assert_eq!(scan("module.exports = { a: 1, };").exports, ["a"]);
}

#[test]
fn whole_object_form_requires_top_level() {
    // Conditional overwrite of the whole exports object is ambiguous and
    // skipped; member assignment inside the same block still counts.
    let out = scan("if (flag) { module.exports = { hidden: 1 }; module.exports.seen = 2; }");
    assert_eq!(out.exports, ["seen"]);
}

#[test]
fn module_exports_member_forms() {
    let out = scan(r#"module.exports.a = 1; module.exports["b"] = 2;"#);
    assert_eq!(out.exports, ["a", "b"]);
}

#[test]
fn member_position_module_is_some_other_object() {
    assert_eq!(scan("host.module.exports = { a: 1 };").exports, EMPTY);
}

#[test]
fn object_spread_of_require_is_a_reexport() {
    let out = scan(r#"module.exports = { ...require("./base"), extra: 1 };"#);
    assert_eq!(out.exports, ["extra"]);
    assert_eq!(out.reexports, ["./base"]);
}

#[test]
fn module_exports_of_require_is_a_reexport() {
    let out = scan(r#"module.exports = require("./impl");"#);
    assert_eq!(out.exports, EMPTY);
    assert_eq!(out.reexports, ["./impl"]);
}

#[test]
fn conditional_module_exports_require_is_skipped() {
    let out = scan(r#"if (dev) { module.exports = require("./dev"); }"#);
    assert_eq!(out.reexports, EMPTY);
}

// === Pattern family 4: Object.defineProperty ===

#[test]
fn define_property_on_exports() {
    let out = scan(r#"Object.defineProperty(exports, "name", { get: function () { return m.name; } });"#);
    assert_eq!(out.exports, ["name"]);
}

#[test]
fn define_property_on_module_exports() {
    let out = scan(r#"Object.defineProperty(module.exports, 'alias', { value: 1 });"#);
    assert_eq!(out.exports, ["alias"]);
}

#[test]
fn define_property_on_other_object_is_ignored() {
    assert_eq!(scan(r#"Object.defineProperty(target, "x", { value: 1 });"#).exports, EMPTY);
}

#[test]
fn define_property_dynamic_name_is_skipped() {
    assert_eq!(scan("Object.defineProperty(exports, name, desc);").exports, EMPTY);
}

#[test]
fn es_module_marker_is_recorded_verbatim() {
    // Downstream consumers filter the interop marker; detection does not.
    let out = scan(r#"Object.defineProperty(exports, "__esModule", { value: true });"#);
    assert_eq!(out.exports, ["__esModule"]);
}

// === Pattern family 5: re-export helper calls ===

#[test]
fn reexport_helper_with_require() {
    let out = scan(r#"__export(require("./other"));"#);
    assert_eq!(out.exports, EMPTY);
    assert_eq!(out.reexports, ["./other"]);
}

#[test]
fn export_star_with_target_argument() {
    let out = scan(r#"__exportStar(require("./lib"), exports);"#);
    assert_eq!(out.reexports, ["./lib"]);
    assert_eq!(out.exports, EMPTY);
}

#[test]
fn dotted_helper_receiver() {
    let out = scan(r#"tslib_1.__exportStar(require("./a"), exports);"#);
    assert_eq!(out.reexports, ["./a"]);
}

#[test]
fn re_export_helper_alias() {
    let out = scan(r#"__reExport(exports_1, require("./b"));"#);
    // First argument is not a require call: nothing detected from it.
    assert_eq!(out.reexports, EMPTY);

    let out = scan(r#"__reExport(require("./b"));"#);
    assert_eq!(out.reexports, ["./b"]);
}

#[test]
fn helper_with_dynamic_specifier_is_skipped() {
    assert_eq!(scan("__export(require(path));").reexports, EMPTY);
    assert_eq!(scan(r#"__export(require("./a" + suffix));"#).reexports, EMPTY);
}

// === Pattern family 6: Object.keys(require(...)) ===

#[test]
fn object_keys_require_idiom() {
    let out = scan(
        r#"Object.keys(require("./all")).forEach(function (k) { exports[k] = all[k]; });"#,
    );
    assert_eq!(out.reexports, ["./all"]);
    // The dynamic `exports[k]` inside the callback records nothing.
    assert_eq!(out.exports, EMPTY);
}

// === Conditional code ===

#[test]
fn conditional_export_is_detected() {
    let out = scan("if (cond) { exports.x = 1; }");
    assert_eq!(out.exports, ["x"]);
    assert!(out.is_complete());
}

#[test]
fn try_block_export_is_detected() {
    let out = scan("try { exports.native = load(); } catch (e) { exports.fallback = 1; }");
    assert_eq!(out.exports, ["native", "fallback"]);
}

#[test]
fn deeply_nested_exports_are_detected() {
    let out = scan("function init() { if (a) { exports.deep = 1; } }");
    assert_eq!(out.exports, ["deep"]);
}

// === Literal-skip correctness ===

#[test]
fn trigger_text_inside_string_is_ignored() {
    assert_eq!(scan(r#""exports.foo = 1";"#).exports, EMPTY);
    assert_eq!(scan(r#"var s = 'module.exports = { a: 1 }';"#).exports, EMPTY);
}

#[test]
fn trigger_text_inside_template_is_ignored() {
    assert_eq!(scan("var t = `exports.foo = 1`;").exports, EMPTY);
}

#[test]
fn trigger_text_inside_comment_is_ignored() {
    assert_eq!(scan("// exports.foo = 1\n").exports, EMPTY);
    assert_eq!(scan("/* exports.foo = 1 */").exports, EMPTY);
}

#[test]
fn trigger_text_inside_regex_is_ignored() {
    assert_eq!(scan("var re = /exports.foo = 1/;").exports, EMPTY);
}

#[test]
fn template_interpolation_is_code() {
    // `${...}` content executes; an assignment there is real.
    let out = scan("var msg = `ready: ${exports.ready = true}`;");
    assert_eq!(out.exports, ["ready"]);
}

// === Result-set properties ===

#[test]
fn idempotent_across_runs() {
    let source = r#"
        exports.a = 1;
        __export(require("./x"));
        module.exports.b = 2;
    "#;
    let first = scan(source);
    let second = scan(source);
    assert_eq!(first, second);
}

#[test]
fn no_duplicate_exports() {
    let out = scan("exports.a = 1; exports.a = 2; exports.a = 3;");
    assert_eq!(out.exports, ["a"]);
}

#[test]
fn no_duplicate_reexports() {
    let out = scan(r#"__export(require("./x")); __export(require("./x"));"#);
    assert_eq!(out.reexports, ["./x"]);
}

#[test]
fn later_assignment_never_removes_earlier_detection() {
    let out = scan("exports.a = 1; exports.b = 2; exports.a = undefined;");
    assert_eq!(out.exports, ["a", "b"]);
}

// === Graceful degradation ===

#[test]
fn unterminated_string_keeps_prior_detections() {
    let out = scan("exports.kept = 1;\nvar s = \"runs off the end");
    assert_eq!(out.exports, ["kept"]);
    assert!(out.flags.contains(ScanFlags::UNTERMINATED_LITERAL));
    assert!(!out.is_complete());
}

#[test]
fn mismatched_closers_keep_scanning_in_tolerant_mode() {
    let out = scan("exports.a = 1; } } exports.b = 2;");
    assert_eq!(out.exports, ["a", "b"]);
    assert!(out.flags.contains(ScanFlags::BRACKET_DESYNC));
}

#[test]
fn strict_mode_stops_recording_after_desync() {
    let source = "exports.a = 1; } } exports.b = 2;";
    let strict = scan_with(
        source,
        &ScanOptions {
            mode: ScanMode::Strict,
            ..ScanOptions::default()
        },
    );
    assert_eq!(strict.exports, ["a"]);
    assert!(strict.flags.contains(ScanFlags::BRACKET_DESYNC));
}

#[test]
fn whole_object_form_distrusted_after_desync() {
    // The tracker clamps back to depth zero after `}`, but top level is
    // no longer *unconditional* — the object form stays off.
    let out = scan("} module.exports = { a: 1 };");
    assert_eq!(out.exports, EMPTY);
}

#[test]
fn empty_input() {
    let out = scan("");
    assert_eq!(out.exports, EMPTY);
    assert_eq!(out.reexports, EMPTY);
    assert!(out.is_complete());
}

#[test]
fn truncated_trigger_at_eof_does_not_panic() {
    for source in ["exports", "exports.", "exports.foo", "module.exports =", "__export(", "__export(require(", "Object.defineProperty(exports,"] {
        let out = scan(source);
        assert_eq!(out.exports, EMPTY, "for {source:?}");
    }
    // The pattern completes at the `=`; a missing right-hand side is the
    // value's problem, not the detector's.
    assert_eq!(scan("exports.foo =").exports, ["foo"]);
}

// === Bounded resources ===

#[test]
fn nesting_past_ceiling_reports_partial() {
    let mut source = String::from("exports.before = 1;");
    source.push_str(&"(".repeat(20));
    let out = scan_with(
        &source,
        &ScanOptions {
            max_depth: 8,
            ..ScanOptions::default()
        },
    );
    assert_eq!(out.exports, ["before"]);
    assert!(out.flags.contains(ScanFlags::DEPTH_LIMIT_REACHED));
    assert!(!out.is_complete());
}

#[test]
fn detection_continues_past_ceiling_in_tolerant_mode() {
    let mut source = String::from("(".repeat(20));
    source.push_str("exports.after = 1;");
    let out = scan_with(
        &source,
        &ScanOptions {
            max_depth: 8,
            ..ScanOptions::default()
        },
    );
    assert_eq!(out.exports, ["after"]);
    assert!(out.flags.contains(ScanFlags::DEPTH_LIMIT_REACHED));
}

// === Odds and ends ===

#[test]
fn bom_prefixed_source() {
    let out = scan("\u{FEFF}exports.a = 1;");
    assert_eq!(out.exports, ["a"]);
}

#[test]
fn division_near_exports_does_not_confuse() {
    let out = scan("var rate = total / count; exports.rate = rate;");
    assert_eq!(out.exports, ["rate"]);
}

#[test]
fn regex_between_exports() {
    let out = scan("exports.a = /[}]/; exports.b = 2;");
    assert_eq!(out.exports, ["a", "b"]);
    assert!(out.is_complete());
}

#[test]
fn realistic_transpiled_module() {
    let source = r#"
"use strict";
Object.defineProperty(exports, "__esModule", { value: true });
exports.parse = exports.tokenize = void 0;
var util_1 = require("./util");
__exportStar(require("./types"), exports);
function tokenize(src) { return src.split(/\s+/); }
exports.tokenize = tokenize;
function parse(src) { return tokenize(src); }
exports.parse = parse;
"#;
    let out = scan(source);
    assert_eq!(out.exports, ["__esModule", "parse", "tokenize"]);
    assert_eq!(out.reexports, ["./types"]);
    assert!(out.is_complete());
}
