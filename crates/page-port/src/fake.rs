//! In-memory page double for consumer crate tests.
//!
//! Models just enough of a document for the locator, primitive, navigator
//! and flow tests: flat element lists per document, visibility flags,
//! accumulated typed values, scripted click side effects and delayed URL
//! changes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use checkout_core_types::UiError;

use crate::port::PagePort;
use crate::types::{DomNode, FrameContext};

/// One element of a fake document.
#[derive(Debug, Clone)]
pub struct FakeElement {
    pub tag: String,
    pub attrs: HashMap<String, String>,
    pub text: String,
    pub visible: bool,
    /// Accumulated typed value; `clear` empties it, `type_text` appends.
    pub value: String,
    /// Visible option texts for `<select>` elements.
    pub options: Vec<String>,
    pub selected: Option<String>,
}

impl FakeElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: HashMap::new(),
            text: String::new(),
            visible: true,
            value: String::new(),
            options: Vec::new(),
            selected: None,
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// One fake document (top-level or iframe content).
#[derive(Debug, Default, Clone)]
pub struct FakeDoc {
    pub elements: Vec<FakeElement>,
}

impl FakeDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element, returning its node handle.
    pub fn push(&mut self, element: FakeElement) -> u64 {
        self.elements.push(element);
        (self.elements.len() - 1) as u64
    }
}

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    top: FakeDoc,
    frames: Vec<FakeDoc>,
    clicks: Vec<(FrameContext, u64)>,
    reveal_on_click: HashMap<(FrameContext, u64), Vec<u64>>,
    url_on_click: HashMap<(FrameContext, u64), String>,
    scheduled_url: Option<(Instant, String)>,
}

impl FakeState {
    fn doc(&self, ctx: FrameContext) -> Result<&FakeDoc, UiError> {
        match ctx {
            FrameContext::Top => Ok(&self.top),
            FrameContext::Frame(i) => self
                .frames
                .get(i)
                .ok_or_else(|| UiError::browser(format!("no such frame: {i}"))),
        }
    }

    fn doc_mut(&mut self, ctx: FrameContext) -> Result<&mut FakeDoc, UiError> {
        match ctx {
            FrameContext::Top => Ok(&mut self.top),
            FrameContext::Frame(i) => self
                .frames
                .get_mut(i)
                .ok_or_else(|| UiError::browser(format!("no such frame: {i}"))),
        }
    }

    fn element_mut(&mut self, ctx: FrameContext, node: u64) -> Result<&mut FakeElement, UiError> {
        self.doc_mut(ctx)?
            .elements
            .get_mut(node as usize)
            .ok_or_else(|| UiError::browser(format!("stale node {node} in {ctx}")))
    }
}

/// Scriptable in-memory [`PagePort`] implementation.
pub struct FakePage {
    state: Mutex<FakeState>,
}

impl FakePage {
    pub fn new(top: FakeDoc) -> Self {
        Self {
            state: Mutex::new(FakeState {
                url: "https://checkout.example/pay".to_string(),
                top,
                ..FakeState::default()
            }),
        }
    }

    pub fn with_frames(top: FakeDoc, frames: Vec<FakeDoc>) -> Self {
        let page = Self::new(top);
        page.lock().frames = frames;
        page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn set_url(&self, url: impl Into<String>) {
        self.lock().url = url.into();
    }

    /// Change the reported URL once `delay` has elapsed.
    pub fn set_url_after(&self, delay: Duration, url: impl Into<String>) {
        self.lock().scheduled_url = Some((Instant::now() + delay, url.into()));
    }

    /// Clicking `node` makes the listed nodes of the same document visible.
    pub fn on_click_reveal(&self, ctx: FrameContext, node: u64, reveals: &[u64]) {
        self.lock()
            .reveal_on_click
            .insert((ctx, node), reveals.to_vec());
    }

    /// Clicking `node` navigates to `url`.
    pub fn on_click_set_url(&self, ctx: FrameContext, node: u64, url: impl Into<String>) {
        self.lock().url_on_click.insert((ctx, node), url.into());
    }

    pub fn clicks(&self) -> Vec<(FrameContext, u64)> {
        self.lock().clicks.clone()
    }

    pub fn value_of(&self, ctx: FrameContext, node: u64) -> String {
        let mut state = self.lock();
        state
            .element_mut(ctx, node)
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    pub fn selected_of(&self, ctx: FrameContext, node: u64) -> Option<String> {
        let mut state = self.lock();
        state
            .element_mut(ctx, node)
            .ok()
            .and_then(|el| el.selected.clone())
    }

    pub fn set_visible(&self, ctx: FrameContext, node: u64, visible: bool) {
        let mut state = self.lock();
        if let Ok(el) = state.element_mut(ctx, node) {
            el.visible = visible;
        }
    }
}

#[async_trait]
impl PagePort for FakePage {
    async fn navigate(&self, url: &str) -> Result<(), UiError> {
        self.lock().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, UiError> {
        let mut state = self.lock();
        if let Some((due, url)) = state.scheduled_url.clone() {
            if Instant::now() >= due {
                state.url = url;
                state.scheduled_url = None;
            }
        }
        Ok(state.url.clone())
    }

    async fn frame_count(&self) -> Result<usize, UiError> {
        Ok(self.lock().frames.len())
    }

    async fn snapshot(&self, ctx: FrameContext) -> Result<Vec<DomNode>, UiError> {
        let state = self.lock();
        let doc = state.doc(ctx)?;
        Ok(doc
            .elements
            .iter()
            .enumerate()
            .map(|(i, el)| DomNode {
                node: i as u64,
                tag: el.tag.clone(),
                attrs: el.attrs.clone(),
                text: el.text.clone(),
                visible: el.visible,
            })
            .collect())
    }

    async fn is_visible(&self, ctx: FrameContext, node: u64) -> Result<bool, UiError> {
        let mut state = self.lock();
        Ok(state.element_mut(ctx, node)?.visible)
    }

    async fn scroll_into_view(&self, _ctx: FrameContext, _node: u64) -> Result<(), UiError> {
        Ok(())
    }

    async fn click(&self, ctx: FrameContext, node: u64) -> Result<(), UiError> {
        let mut state = self.lock();
        state.element_mut(ctx, node)?;
        state.clicks.push((ctx, node));
        if let Some(reveals) = state.reveal_on_click.get(&(ctx, node)).cloned() {
            for target in reveals {
                if let Ok(el) = state.element_mut(ctx, target) {
                    el.visible = true;
                }
            }
        }
        if let Some(url) = state.url_on_click.get(&(ctx, node)).cloned() {
            state.url = url;
        }
        Ok(())
    }

    async fn clear(&self, ctx: FrameContext, node: u64) -> Result<(), UiError> {
        let mut state = self.lock();
        state.element_mut(ctx, node)?.value.clear();
        Ok(())
    }

    async fn type_text(&self, ctx: FrameContext, node: u64, text: &str) -> Result<(), UiError> {
        let mut state = self.lock();
        state.element_mut(ctx, node)?.value.push_str(text);
        Ok(())
    }

    async fn select_by_visible_text(
        &self,
        ctx: FrameContext,
        node: u64,
        text: &str,
    ) -> Result<bool, UiError> {
        let mut state = self.lock();
        let el = state.element_mut(ctx, node)?;
        if el.tag != "select" {
            return Ok(false);
        }
        if el.options.iter().any(|o| o == text) {
            el.selected = Some(text.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn screenshot(&self) -> Result<Vec<u8>, UiError> {
        Ok(b"fake-png".to_vec())
    }
}
