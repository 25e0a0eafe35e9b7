//! Submission hooks
//!
//! Pre-submission hooks rewrite a payload before it is sent; post-submission
//! actions are side effects run after a record was created or updated. Each
//! hook is registered with a [`HookScope`] and pipelines run them in
//! registration order.

pub mod attachment;
pub mod md5;

use crate::alias::add_alias_prefix;
use crate::error::Result;
use crate::payload::{Payload, ALIASES_PROP};
use std::fmt;
use tracing::debug;

pub use attachment::{build_attachment, ATTACHMENT_PROP};

/// Kind of submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which submissions a hook runs for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookScope {
    Any,
    Only(Method),
}

impl HookScope {
    pub fn applies_to(&self, method: Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => *only == method,
        }
    }
}

/// What a hook may know about the submission in progress
#[derive(Debug, Clone)]
pub struct HookContext<'a> {
    pub method: Method,
    pub profile_id: &'a str,
    /// `<lab>:` when a lab is configured
    pub lab_prefix: Option<&'a str>,
}

/// Payload transformations run before a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreSubmitHook {
    /// Expand `attachment: {path: ...}` into an inline data URI attachment
    Attachment,
    /// Prefix unprefixed aliases with the lab
    AliasPrefix,
    /// Fill in `md5sum` of a file record from its local file
    FileMd5,
}

impl PreSubmitHook {
    pub fn apply(&self, payload: Payload, ctx: &HookContext<'_>) -> Result<Payload> {
        match self {
            Self::Attachment => attachment::expand_attachment(payload),
            Self::AliasPrefix => Ok(prefix_aliases(payload, ctx.lab_prefix)),
            Self::FileMd5 => md5::set_file_md5sum(payload, ctx.profile_id),
        }
    }
}

fn prefix_aliases(mut payload: Payload, lab_prefix: Option<&str>) -> Payload {
    let Some(prefix) = lab_prefix else {
        return payload;
    };
    if !payload.contains_key(ALIASES_PROP) {
        return payload;
    }
    let aliases = add_alias_prefix(&payload.aliases(), prefix);
    payload.set_aliases(aliases);
    payload
}

/// Ordered pre-submission hooks
#[derive(Debug, Clone, Default)]
pub struct PreSubmitPipeline {
    hooks: Vec<(HookScope, PreSubmitHook)>,
}

impl PreSubmitPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attachment expansion, alias prefixing, then md5 computation on create
    pub fn standard() -> Self {
        Self::new()
            .with(HookScope::Any, PreSubmitHook::Attachment)
            .with(HookScope::Any, PreSubmitHook::AliasPrefix)
            .with(HookScope::Only(Method::Post), PreSubmitHook::FileMd5)
    }

    pub fn with(mut self, scope: HookScope, hook: PreSubmitHook) -> Self {
        self.hooks.push((scope, hook));
        self
    }

    pub fn hooks_for(&self, method: Method) -> impl Iterator<Item = PreSubmitHook> + '_ {
        self.hooks
            .iter()
            .filter(move |(scope, _)| scope.applies_to(method))
            .map(|(_, hook)| *hook)
    }

    pub fn run(&self, mut payload: Payload, ctx: &HookContext<'_>) -> Result<Payload> {
        for hook in self.hooks_for(ctx.method) {
            debug!(?hook, method = %ctx.method, "Running pre-submit hook");
            payload = hook.apply(payload, ctx)?;
        }
        Ok(payload)
    }
}

/// Side effects run after a successful submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSubmitAction {
    /// Upload the local file of a newly created file record
    CloudUpload,
}

/// Ordered post-submission actions
#[derive(Debug, Clone, Default)]
pub struct PostSubmitPipeline {
    actions: Vec<(HookScope, PostSubmitAction)>,
}

impl PostSubmitPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloud upload after creating a file record
    pub fn standard() -> Self {
        Self::new().with(HookScope::Only(Method::Post), PostSubmitAction::CloudUpload)
    }

    pub fn with(mut self, scope: HookScope, action: PostSubmitAction) -> Self {
        self.actions.push((scope, action));
        self
    }

    pub fn actions_for(&self, method: Method) -> Vec<PostSubmitAction> {
        self.actions
            .iter()
            .filter(|(scope, _)| scope.applies_to(method))
            .map(|(_, action)| *action)
            .collect()
    }
}
