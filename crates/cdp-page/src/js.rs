//! Script builders for the in-page interaction layer.
//!
//! Each snapshot stores the element list on the scoped document's window
//! (`window.__checkoutNodes`), so node handles are plain indices into that
//! registry until the next snapshot replaces it.

use page_port::FrameContext;

/// Expression yielding the scoped document, or `null` when the frame is
/// missing or not scriptable.
pub(crate) fn scope_expr(ctx: FrameContext) -> String {
    match ctx {
        FrameContext::Top => "document".to_string(),
        FrameContext::Frame(index) => format!(
            "(() => {{ const f = document.querySelectorAll('iframe')[{index}]; \
             try {{ return f ? f.contentDocument : null; }} catch (e) {{ return null; }} }})()"
        ),
    }
}

pub(crate) fn frame_count_script() -> String {
    "document.querySelectorAll('iframe').length".to_string()
}

pub(crate) fn snapshot_script(ctx: FrameContext) -> String {
    format!(
        r#"(() => {{
  const doc = {scope};
  if (!doc || !doc.defaultView) return {{ ok: false, nodes: [] }};
  const win = doc.defaultView;
  const all = Array.from(doc.querySelectorAll('*'));
  win.__checkoutNodes = all;
  const visible = (el) => {{
    if (!el.getClientRects || el.getClientRects().length === 0) return false;
    const style = win.getComputedStyle(el);
    return style.display !== 'none' && style.visibility !== 'hidden';
  }};
  const nodes = all.map((el, i) => {{
    const attrs = {{}};
    for (const a of el.attributes) attrs[a.name] = a.value;
    return {{
      node: i,
      tag: el.tagName.toLowerCase(),
      attrs: attrs,
      text: (el.innerText || el.textContent || '').trim().slice(0, 400),
      visible: visible(el),
    }};
  }});
  return {{ ok: true, nodes: nodes }};
}})()"#,
        scope = scope_expr(ctx)
    )
}

/// Wrap an action body so it runs against one registered node. The body
/// must end with a `return {{ ok: true, ... }}`.
fn with_node(ctx: FrameContext, node: u64, body: &str) -> String {
    format!(
        r#"(() => {{
  const doc = {scope};
  if (!doc || !doc.defaultView) return {{ ok: false, error: 'no-document' }};
  const win = doc.defaultView;
  const el = (win.__checkoutNodes || [])[{node}];
  if (!el) return {{ ok: false, error: 'stale-node' }};
  {body}
}})()"#,
        scope = scope_expr(ctx)
    )
}

pub(crate) fn click_script(ctx: FrameContext, node: u64) -> String {
    with_node(ctx, node, "el.click(); return { ok: true };")
}

pub(crate) fn scroll_script(ctx: FrameContext, node: u64) -> String {
    with_node(
        ctx,
        node,
        "el.scrollIntoView({ block: 'center' }); return { ok: true };",
    )
}

pub(crate) fn visible_script(ctx: FrameContext, node: u64) -> String {
    with_node(
        ctx,
        node,
        r#"const rects = el.getClientRects ? el.getClientRects() : [];
  const style = win.getComputedStyle(el);
  const visible = rects.length > 0 && style.display !== 'none' && style.visibility !== 'hidden';
  return { ok: true, visible: visible };"#,
    )
}

const FIRE_EVENTS: &str = "el.dispatchEvent(new win.Event('input', { bubbles: true })); \
  el.dispatchEvent(new win.Event('change', { bubbles: true }));";

pub(crate) fn clear_script(ctx: FrameContext, node: u64) -> String {
    let body = format!(
        "if (el.isContentEditable) {{ el.textContent = ''; }} else {{ el.value = ''; }}\n  \
         {FIRE_EVENTS}\n  return {{ ok: true }};"
    );
    with_node(ctx, node, &body)
}

pub(crate) fn type_text_script(ctx: FrameContext, node: u64, text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    let body = format!(
        "el.focus();\n  \
         if (el.isContentEditable) {{ el.textContent = (el.textContent || '') + {quoted}; }}\n  \
         else {{ el.value = (el.value || '') + {quoted}; }}\n  \
         {FIRE_EVENTS}\n  return {{ ok: true }};"
    );
    with_node(ctx, node, &body)
}

pub(crate) fn select_script(ctx: FrameContext, node: u64, text: &str) -> String {
    let quoted = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    let body = format!(
        "if (el.tagName !== 'SELECT') return {{ ok: true, matched: false }};\n  \
         const target = Array.from(el.options).find((o) => (o.textContent || '').trim() === {quoted});\n  \
         if (!target) return {{ ok: true, matched: false }};\n  \
         el.value = target.value;\n  \
         {FIRE_EVENTS}\n  return {{ ok: true, matched: true }};"
    );
    with_node(ctx, node, &body)
}
