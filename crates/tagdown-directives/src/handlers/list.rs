//! `assertions`, `requirements` and `timeouts` command notes.
//!
//! Each directive takes a kind and a command name and expands to a fixed
//! Markdown bullet list describing that command:
//!
//! ```text
//! {% assertions none cy.clearCookies %}
//! ::requirements{type=child cmd=click}
//! ```

use std::marker::PhantomData;

use super::Choice;
use crate::{DirectiveArgs, DirectiveContext, DirectiveError, DirectiveOutput, LeafDirective};

const RETRY: &str = "[retry](/guides/core-concepts/retry-ability)";
const IN_DOM: &str = "[exist in the DOM](/guides/core-concepts/introduction-to-cypress#Default-Assertions)";
const ACTIONABLE: &str = "[actionable state](/guides/core-concepts/interacting-with-elements)";

/// A closed set of list templates behind one directive name.
pub trait ListKind: Choice {
    /// Directive name, e.g. `assertions`.
    const DIRECTIVE: &'static str;

    /// Bullet lines for `cmd`, already formatted as inline code.
    fn lines(self, cmd: &str) -> Vec<String>;
}

/// Leaf handler shared by every [`ListKind`].
pub struct ListDirective<K>(PhantomData<fn() -> K>);

impl<K: ListKind> ListDirective<K> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K: ListKind> Default for ListDirective<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ListKind> LeafDirective for ListDirective<K> {
    fn name(&self) -> &'static str {
        K::DIRECTIVE
    }

    fn process(
        &self,
        args: &DirectiveArgs,
        _ctx: &DirectiveContext,
    ) -> Result<DirectiveOutput, DirectiveError> {
        let kind = args
            .arg(0)
            .or_else(|| args.get("type"))
            .ok_or(DirectiveError::MissingArgument("type"))?;
        let kind = K::parse(kind)?;
        let cmd = args
            .arg(1)
            .or_else(|| args.get("cmd"))
            .ok_or(DirectiveError::MissingArgument("command"))?;

        let lines = kind.lines(&display_command(cmd));
        let list: Vec<String> = lines.iter().map(|line| format!("- {line}")).collect();
        Ok(DirectiveOutput::Text(list.join("\n")))
    }
}

/// `cy.get` stays as written, `click` becomes `.click`; both gain `()`.
fn display_command(cmd: &str) -> String {
    let cmd = cmd.trim_matches('`').trim_end_matches("()");
    if cmd.starts_with("cy.") || cmd.starts_with("Cypress.") || cmd.starts_with('.') {
        format!("`{cmd}()`")
    } else {
        format!("`.{cmd}()`")
    }
}

fn retries_assertions(cmd: &str) -> String {
    format!("{cmd} will automatically {RETRY} until all chained assertions have passed.")
}

fn runs_assertions_once(cmd: &str) -> String {
    format!("{cmd} will only run assertions you have chained once, and will not {RETRY}.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionKind {
    None,
    Once,
    Retry,
    Existence,
    DualExistence,
    Actionable,
    Wait,
    Its,
    Utility,
    Request,
    Execute,
}

impl Choice for AssertionKind {
    const WHAT: &'static str = "assertions type";
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Once,
        Self::Retry,
        Self::Existence,
        Self::DualExistence,
        Self::Actionable,
        Self::Wait,
        Self::Its,
        Self::Utility,
        Self::Request,
        Self::Execute,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Once => "once",
            Self::Retry => "retry",
            Self::Existence => "existence",
            Self::DualExistence => "dual_existence",
            Self::Actionable => "actionable",
            Self::Wait => "wait",
            Self::Its => "its",
            Self::Utility => "utility",
            Self::Request => "request",
            Self::Execute => "execute",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::DualExistence => &["dualExistence"],
            _ => &[],
        }
    }
}

impl ListKind for AssertionKind {
    const DIRECTIVE: &'static str = "assertions";

    fn lines(self, cmd: &str) -> Vec<String> {
        match self {
            Self::None => vec![format!("{cmd} cannot have any assertions chained.")],
            Self::Once => vec![runs_assertions_once(cmd)],
            Self::Retry => vec![retries_assertions(cmd)],
            Self::Existence => vec![
                format!("{cmd} will automatically {RETRY} until the element(s) {IN_DOM}."),
                retries_assertions(cmd),
            ],
            Self::DualExistence => vec![
                format!(
                    "{cmd} will automatically {RETRY} until the element(s) {IN_DOM} when chained off a command that yields DOM element(s)."
                ),
                retries_assertions(cmd),
            ],
            Self::Actionable => vec![
                format!("{cmd} will automatically wait for the element to reach an {ACTIONABLE}."),
                retries_assertions(cmd),
            ],
            Self::Wait => vec![format!(
                "{cmd} will only run assertions you have chained once, after the wait has completed, and will not {RETRY}."
            )],
            Self::Its => vec![
                format!(
                    "{cmd} will automatically {RETRY} until it has a property that is not `null` or `undefined`."
                ),
                retries_assertions(cmd),
            ],
            Self::Utility => vec![format!(
                "{cmd} is a utility command; it yields its subject and runs no assertions of its own."
            )],
            Self::Request => vec![
                runs_assertions_once(cmd),
                format!(
                    "{cmd} fails when the response status code is not `2xx` or `3xx` unless `failOnStatusCode` is `false`."
                ),
            ],
            Self::Execute => vec![
                runs_assertions_once(cmd),
                format!(
                    "{cmd} fails when the command exits with a non-zero code unless `failOnNonZeroExit` is `false`."
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Parent,
    Child,
    Dual,
    Blurability,
    Focusability,
    Checkability,
    Selectability,
    Clearability,
    Scrollability,
    Submitability,
    Dom,
}

impl Choice for RequirementKind {
    const WHAT: &'static str = "requirements type";
    const ALL: &'static [Self] = &[
        Self::Parent,
        Self::Child,
        Self::Dual,
        Self::Blurability,
        Self::Focusability,
        Self::Checkability,
        Self::Selectability,
        Self::Clearability,
        Self::Scrollability,
        Self::Submitability,
        Self::Dom,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Dual => "dual",
            Self::Blurability => "blurability",
            Self::Focusability => "focusability",
            Self::Checkability => "checkability",
            Self::Selectability => "selectability",
            Self::Clearability => "clearability",
            Self::Scrollability => "scrollability",
            Self::Submitability => "submitability",
            Self::Dom => "dom",
        }
    }
}

impl ListKind for RequirementKind {
    const DIRECTIVE: &'static str = "requirements";

    fn lines(self, cmd: &str) -> Vec<String> {
        let dom = format!("{cmd} requires being chained off a command that yields DOM element(s).");
        let requires = |what: &str| vec![dom.clone(), format!("{cmd} requires the element {what}.")];

        match self {
            Self::Parent => vec![format!("{cmd} requires being chained off of `cy`.")],
            Self::Child => vec![format!("{cmd} requires being chained off a previous command.")],
            Self::Dual => vec![format!(
                "{cmd} can be chained off of `cy` or off a command that yields DOM element(s)."
            )],
            Self::Blurability => vec![
                dom.clone(),
                format!("{cmd} requires the element to currently have focus."),
                format!("{cmd} requires the element to be able to receive blur events."),
            ],
            Self::Focusability => requires("to be able to receive focus"),
            Self::Checkability => requires("to be an `<input>` with type `checkbox` or `radio`"),
            Self::Selectability => requires("to be a `<select>`"),
            Self::Clearability => requires("to be an `<input>` or `<textarea>`"),
            Self::Scrollability => vec![format!(
                "{cmd} can be chained off of `cy` or off a command that yields a scrollable DOM element."
            )],
            Self::Submitability => requires("to be a `<form>`"),
            Self::Dom => vec![dom.clone()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    None,
    Assertions,
    Existence,
    Actions,
    Automation,
    Exec,
    Task,
    Request,
    Wait,
    Its,
    Intercept,
}

impl Choice for TimeoutKind {
    const WHAT: &'static str = "timeouts type";
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Assertions,
        Self::Existence,
        Self::Actions,
        Self::Automation,
        Self::Exec,
        Self::Task,
        Self::Request,
        Self::Wait,
        Self::Its,
        Self::Intercept,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Assertions => "assertions",
            Self::Existence => "existence",
            Self::Actions => "actions",
            Self::Automation => "automation",
            Self::Exec => "exec",
            Self::Task => "task",
            Self::Request => "request",
            Self::Wait => "wait",
            Self::Its => "its",
            Self::Intercept => "intercept",
        }
    }
}

impl ListKind for TimeoutKind {
    const DIRECTIVE: &'static str = "timeouts";

    fn lines(self, cmd: &str) -> Vec<String> {
        let assertions = format!("{cmd} can time out waiting for assertions you've added to pass.");

        match self {
            Self::None => vec![format!("{cmd} cannot time out.")],
            Self::Assertions => vec![assertions],
            Self::Existence => vec![
                format!("{cmd} can time out waiting for the element(s) to {IN_DOM}."),
                assertions,
            ],
            Self::Actions => vec![
                format!("{cmd} can time out waiting for the element to reach an {ACTIONABLE}."),
                assertions,
            ],
            Self::Automation => vec![
                format!("{cmd} should never time out."),
                format!(
                    "Because {cmd} is asynchronous it is technically possible for there to be a timeout while talking to the internal Cypress automation APIs. But for practical purposes it should never happen."
                ),
            ],
            Self::Exec => vec![
                format!("{cmd} can time out waiting for the system command to exit."),
                assertions,
            ],
            Self::Task => vec![
                format!("{cmd} can time out waiting for the task to end."),
                assertions,
            ],
            Self::Request => vec![
                format!("{cmd} can time out waiting for the server to respond."),
                assertions,
            ],
            Self::Wait => vec![
                format!("{cmd} can time out waiting for the request to go out."),
                format!("{cmd} can time out waiting for the response to return."),
            ],
            Self::Its => vec![
                format!("{cmd} can time out waiting for the property to exist."),
                assertions,
            ],
            Self::Intercept => vec![format!(
                "{cmd} cannot time out; wait on the intercepted request with `cy.wait()` instead."
            )],
        }
    }
}
