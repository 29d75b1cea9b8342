//! Recognized-pattern table: trigger identifiers and their handlers.
//!
//! The export matcher consults this table at every identifier token.
//! The table is the single extension point for new export/re-export
//! idioms — adding a helper name is a data change, not a control-flow
//! change.

/// Pattern family attempted when a trigger identifier is seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    /// `exports.name =` / `exports["name"] =`
    ExportsMember,
    /// `module.exports` forms: member assignment, whole-object literal,
    /// `= require("...")` forwarding.
    ModuleExports,
    /// `Object.defineProperty(exports, "name", ...)` and
    /// `Object.keys(require("..."))`.
    DefineHost,
    /// Re-export helper call taking `require("...")` as its first
    /// argument (`__export`, `__exportStar`, `__reExport`).
    ReexportHelper,
}

/// One trigger identifier and how to treat it.
#[derive(Debug)]
pub struct Trigger {
    /// The identifier text, byte-exact.
    pub name: &'static [u8],
    /// Which pattern family to attempt.
    pub kind: PatternKind,
    /// Whether the trigger still fires in member position — helper
    /// functions are often reached through a module object
    /// (`tslib_1.__exportStar(...)`), while `exports` in member position
    /// (`foo.exports`) is some other object's property.
    pub allow_after_dot: bool,
}

/// The recognized triggers. Order is irrelevant; the set is small enough
/// that linear lookup beats hashing.
pub static TRIGGERS: &[Trigger] = &[
    Trigger {
        name: b"exports",
        kind: PatternKind::ExportsMember,
        allow_after_dot: false,
    },
    Trigger {
        name: b"module",
        kind: PatternKind::ModuleExports,
        allow_after_dot: false,
    },
    Trigger {
        name: b"Object",
        kind: PatternKind::DefineHost,
        allow_after_dot: false,
    },
    Trigger {
        name: b"__export",
        kind: PatternKind::ReexportHelper,
        allow_after_dot: true,
    },
    Trigger {
        name: b"__exportStar",
        kind: PatternKind::ReexportHelper,
        allow_after_dot: true,
    },
    Trigger {
        name: b"__reExport",
        kind: PatternKind::ReexportHelper,
        allow_after_dot: true,
    },
];

/// Look up the trigger for an identifier, if any.
pub fn lookup(name: &[u8]) -> Option<&'static Trigger> {
    TRIGGERS.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests;
