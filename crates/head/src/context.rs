//! Per-request capture for server rendering.
//!
//! Each `render_to_context` call owns a fresh manager, so concurrent renders
//! never observe each other's contributors.

use crate::config::HeadConfig;
use crate::declarative::{ChildError, Element};
use crate::manager::HeadManager;
use crate::props::PropBag;
use crate::registry::InstanceId;
use crate::state::HeadState;

/// Capture slot supplied by the rendering harness.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadContext {
    pub head: Option<HeadState>,
}

impl HeadContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured state, or the fallback when nothing was captured.
    pub fn head_or_fallback(&self) -> HeadState {
        self.head.clone().unwrap_or_default()
    }
}

/// Contributor surface handed to the render closure.
pub struct RenderScope {
    manager: HeadManager,
}

impl RenderScope {
    pub fn contribute(&mut self, props: PropBag) -> InstanceId {
        self.manager.mount(props)
    }

    pub fn contribute_children(&mut self, children: &[Element]) -> Result<InstanceId, ChildError> {
        let props = PropBag::from_children(children)?;
        Ok(self.manager.mount(props))
    }

    pub fn update(&mut self, id: InstanceId, props: PropBag) -> bool {
        self.manager.update(id, props)
    }

    pub fn remove(&mut self, id: InstanceId) -> bool {
        self.manager.unmount(id)
    }

    /// State as resolved so far in this render.
    pub fn peek(&mut self) -> HeadState {
        self.manager.peek()
    }
}

/// Run one isolated render pass and store its resolved head in `context`.
pub fn render_to_context<R, F>(config: HeadConfig, context: &mut HeadContext, render: F) -> R
where
    F: FnOnce(&mut RenderScope) -> R,
{
    let mut scope = RenderScope {
        manager: HeadManager::server(config),
    };
    let output = render(&mut scope);
    context.head = Some(scope.manager.rewind());
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_into_context() {
        let mut context = HeadContext::new();
        let body = render_to_context(HeadConfig::default(), &mut context, |scope| {
            scope.contribute(PropBag::new().title("Outer"));
            scope
                .contribute_children(&[Element::new("title").text("Inner")])
                .expect("children");
            "<main/>"
        });
        assert_eq!(body, "<main/>");
        assert_eq!(
            context.head.and_then(|h| h.title_text()).as_deref(),
            Some("Inner")
        );
    }

    #[test]
    fn empty_render_captures_fallback() {
        let mut context = HeadContext::new();
        render_to_context(HeadConfig::default(), &mut context, |_| ());
        assert_eq!(context.head, Some(HeadState::fallback()));
    }

    #[test]
    fn renders_are_isolated() {
        let mut first = HeadContext::new();
        let mut second = HeadContext::new();
        render_to_context(HeadConfig::default(), &mut first, |scope| {
            scope.contribute(PropBag::new().title("first"));
        });
        render_to_context(HeadConfig::default(), &mut second, |_| ());
        assert_eq!(second.head_or_fallback(), HeadState::fallback());
        assert_eq!(first.head_or_fallback().title_text().as_deref(), Some("first"));
    }

    #[test]
    fn removed_contributors_do_not_leak_into_capture() {
        let mut context = HeadContext::new();
        render_to_context(HeadConfig::default(), &mut context, |scope| {
            scope.contribute(PropBag::new().title("kept"));
            let id = scope.contribute(PropBag::new().title("dropped"));
            assert!(scope.remove(id));
        });
        assert_eq!(context.head_or_fallback().title_text().as_deref(), Some("kept"));
    }
}
