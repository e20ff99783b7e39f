//! Opening collapsed content before export.
//!
//! Documentation sites hide much of their content behind accordions,
//! `<details>` elements and "collapsed" sections. The expansion pass visits
//! every element matched by [`EXPAND_RULES`] and forces it open.
//!
//! The pass is best-effort: each element is mutated on its own and a failure
//! on one element (detached node, handler throwing, ...) is logged and
//! counted, never propagated. Only a failure to *query* the page aborts the
//! pass.
//!
//! The same rule table drives two renditions:
//!
//! - [`expand_page`] runs the rules element by element through a
//!   [`PageSession`] (local and remote Chrome backends);
//! - [`expansion_script`] compiles them into a standalone script for hosted
//!   renderers that only accept script payloads.

use std::fmt::Display;

use crate::error::Result;
use crate::session::PageSession;

/// Mutation applied to each element matched by an [`ExpandRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandAction {
    /// Trigger the element's click handler.
    Click,
    /// Set the `open` attribute (native disclosure elements).
    ForceOpen,
    /// Remove a CSS class used only to hide content.
    RemoveClass(&'static str),
}

impl ExpandAction {
    /// Statement applying the action to the element bound to `var`.
    pub fn js_statement(&self, var: &str) -> String {
        match self {
            ExpandAction::Click => format!("{}.click();", var),
            ExpandAction::ForceOpen => format!("{}.setAttribute('open', '');", var),
            ExpandAction::RemoveClass(class) => {
                format!("{}.classList.remove({});", var, js_string(class))
            }
        }
    }

    /// Function declaration applying the action to `this`, suitable for
    /// `Runtime.callFunctionOn`.
    pub fn js_function(&self) -> String {
        format!("function() {{ {} }}", self.js_statement("this"))
    }
}

/// A selector and the action applied to everything it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandRule {
    /// CSS selector.
    pub selector: &'static str,
    /// Mutation applied to each match.
    pub action: ExpandAction,
}

/// Rules applied, in order, by the expansion pass.
pub const EXPAND_RULES: &[ExpandRule] = &[
    ExpandRule {
        selector: r#"[aria-expanded="false"]"#,
        action: ExpandAction::Click,
    },
    ExpandRule {
        selector: "details:not([open])",
        action: ExpandAction::ForceOpen,
    },
    ExpandRule {
        selector: ".collapsed",
        action: ExpandAction::RemoveClass("collapsed"),
    },
];

/// Tally of a best-effort batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandOutcome {
    /// Operations attempted.
    pub attempted: usize,
    /// Operations that failed and were skipped.
    pub failed: usize,
}

impl ExpandOutcome {
    /// Operations that succeeded.
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    fn merge(&mut self, other: ExpandOutcome) {
        self.attempted += other.attempted;
        self.failed += other.failed;
    }
}

/// Run `op` on every item, isolating failures.
///
/// A failing item is logged and counted; the remaining items still run.
///
/// # Example
///
/// ```rust
/// use page2pdf_api::page::apply_best_effort;
///
/// let outcome = apply_best_effort(vec![1, 2, 3, 4], |n| {
///     if *n == 3 { Err("not clickable") } else { Ok(()) }
/// }, "buttons");
///
/// assert_eq!(outcome.attempted, 4);
/// assert_eq!(outcome.failed, 1);
/// ```
pub fn apply_best_effort<T, E, I, F>(items: I, mut op: F, label: &str) -> ExpandOutcome
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> std::result::Result<(), E>,
    E: Display,
{
    let mut outcome = ExpandOutcome::default();

    for (index, item) in items.into_iter().enumerate() {
        outcome.attempted += 1;
        if let Err(e) = op(&item) {
            outcome.failed += 1;
            log::debug!("Skipping {} #{}: {}", label, index, e);
        }
    }

    outcome
}

/// Run every [`EXPAND_RULES`] entry against the session's page.
///
/// # Errors
///
/// Returns an error only when the page cannot be queried for a selector.
/// Per-element failures are absorbed into the returned [`ExpandOutcome`].
pub fn expand_page<S: PageSession>(session: &S) -> Result<ExpandOutcome> {
    let mut total = ExpandOutcome::default();

    for rule in EXPAND_RULES {
        let targets = session.find_targets(rule.selector)?;
        log::trace!("Expansion rule '{}' matched {} elements", rule.selector, targets.len());

        let outcome = apply_best_effort(
            targets,
            |target| session.apply(target, rule.action),
            rule.selector,
        );
        total.merge(outcome);
    }

    if total.failed > 0 {
        log::warn!(
            "Expanded {} of {} elements ({} skipped)",
            total.succeeded(),
            total.attempted,
            total.failed
        );
    } else {
        log::debug!("Expanded {} elements", total.attempted);
    }

    Ok(total)
}

/// Standalone script performing the expansion pass inside the page.
///
/// Each element is wrapped in its own `try`, so one failure never stops the
/// rest. The script evaluates to `{ attempted, failed }`.
pub fn expansion_script() -> String {
    let mut script = String::from("(() => {\n    let attempted = 0;\n    let failed = 0;\n");

    for rule in EXPAND_RULES {
        script.push_str(&format!(
            "    document.querySelectorAll({}).forEach(el => {{ attempted++; try {{ {} }} catch (e) {{ failed++; }} }});\n",
            js_string(rule.selector),
            rule.action.js_statement("el"),
        ));
    }

    script.push_str("    return { attempted, failed };\n})();");
    script
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_cover_disclosure_widgets() {
        let selectors: Vec<_> = EXPAND_RULES.iter().map(|r| r.selector).collect();
        assert_eq!(
            selectors,
            vec![r#"[aria-expanded="false"]"#, "details:not([open])", ".collapsed"]
        );
    }

    #[test]
    fn test_action_statements() {
        assert_eq!(ExpandAction::Click.js_statement("el"), "el.click();");
        assert_eq!(
            ExpandAction::ForceOpen.js_statement("el"),
            "el.setAttribute('open', '');"
        );
        assert_eq!(
            ExpandAction::RemoveClass("collapsed").js_statement("el"),
            r#"el.classList.remove("collapsed");"#
        );
    }

    #[test]
    fn test_action_function_targets_this() {
        assert_eq!(
            ExpandAction::Click.js_function(),
            "function() { this.click(); }"
        );
    }

    #[test]
    fn test_best_effort_continues_after_failure() {
        let mut visited = Vec::new();
        let outcome = apply_best_effort(
            vec!["a", "broken", "c"],
            |item| {
                visited.push(*item);
                if *item == "broken" {
                    Err("element is not clickable")
                } else {
                    Ok(())
                }
            },
            "test",
        );

        assert_eq!(visited, vec!["a", "broken", "c"]);
        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.succeeded(), 2);
    }

    #[test]
    fn test_best_effort_empty_batch() {
        let outcome = apply_best_effort(Vec::<u8>::new(), |_| Ok::<(), String>(()), "none");
        assert_eq!(outcome, ExpandOutcome::default());
    }

    #[test]
    fn test_best_effort_all_failing() {
        let outcome = apply_best_effort(0..5, |_| Err("detached"), "all");
        assert_eq!(outcome.attempted, 5);
        assert_eq!(outcome.failed, 5);
        assert_eq!(outcome.succeeded(), 0);
    }

    #[test]
    fn test_expansion_script_isolates_each_element() {
        let script = expansion_script();

        assert_eq!(script.matches("try {").count(), EXPAND_RULES.len());
        assert!(script.contains(r#"document.querySelectorAll("[aria-expanded=\"false\"]")"#));
        assert!(script.contains(r#"document.querySelectorAll("details:not([open])")"#));
        assert!(script.contains(r#"el.classList.remove("collapsed");"#));
        assert!(script.contains("return { attempted, failed };"));
    }
}
