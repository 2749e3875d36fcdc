// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless host: synthetic elements with rectangles, plus an in-memory key bus.
//!
//! Useful for tests, demos, and for driving the navigator from an engine that does not
//! have its own element tree. [`HeadlessHost`] and [`KeyBus`] are cheap, clonable
//! handles onto shared single-threaded state, so a test can keep a copy while the
//! navigator holds another.
//!
//! ```
//! use kurbo::Rect;
//! use understory_keynav::headless::{ElementFlags, HeadlessHost, KeyBus};
//! use understory_keynav::{ARROW_KEY_HANDLERS, Navigator};
//!
//! let host = HeadlessHost::new();
//! let keys = KeyBus::new();
//! let root = host.root();
//! let left = host.insert(root, Rect::new(0.0, 0.0, 10.0, 10.0), ElementFlags::FOCUS_ORDER);
//! let right = host.insert(root, Rect::new(20.0, 0.0, 30.0, 10.0), ElementFlags::FOCUS_ORDER);
//!
//! let mut navigator = Navigator::new(host.clone(), root, keys.clone());
//! navigator.handle_keys(ARROW_KEY_HANDLERS);
//! navigator.setup();
//!
//! keys.press("ArrowRight"); // nothing focused yet: picks the first element
//! assert_eq!(host.active(), Some(left));
//! keys.press("ArrowRight");
//! assert_eq!(host.active(), Some(right));
//!
//! navigator.destroy();
//! keys.press("ArrowRight");
//! assert_eq!(host.active(), Some(right));
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use kurbo::Rect;

use crate::host::{FocusHost, KeyListener, KeySource};

/// Identifier for an element of a [`HeadlessHost`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ElementId(u32);

impl ElementId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Headless documents stay far below u32::MAX elements."
    )]
    const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-element focus state of a headless element.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Element declares a focus-order priority.
        const FOCUS_ORDER = 0b0000_0001;
        /// Element has no box; it and its descendants are not rendered.
        const HIDDEN      = 0b0000_0010;
        /// Element is disabled.
        const DISABLED    = 0b0000_0100;
    }
}

/// Callback run synchronously after [`FocusHost::focus`] moves focus.
pub type FocusHook = Box<dyn FnMut(ElementId)>;

struct Node {
    rect: Rect,
    flags: ElementFlags,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

struct Document {
    nodes: Vec<Node>,
    active: Option<ElementId>,
    focus_log: Vec<ElementId>,
    focus_hook: Option<FocusHook>,
}

impl Document {
    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.idx())
    }

    fn children(&self, id: ElementId) -> &[ElementId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    fn is_rendered(&self, id: ElementId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                return false;
            };
            if node.flags.contains(ElementFlags::HIDDEN) {
                return false;
            }
            cursor = node.parent;
        }
        true
    }
}

/// In-memory element tree implementing [`FocusHost`].
///
/// Every host starts with a root element (see [`HeadlessHost::root`]) that does not take
/// part in the focus order; use it as the navigator's scope to govern the whole document.
#[derive(Clone)]
pub struct HeadlessHost {
    doc: Rc<RefCell<Document>>,
}

impl fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.doc.borrow();
        f.debug_struct("HeadlessHost")
            .field("elements", &doc.nodes.len())
            .field("active", &doc.active)
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Create a document containing only the root element.
    pub fn new() -> Self {
        let root = Node {
            rect: Rect::ZERO,
            flags: ElementFlags::empty(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            doc: Rc::new(RefCell::new(Document {
                nodes: alloc::vec![root],
                active: None,
                focus_log: Vec::new(),
                focus_hook: None,
            })),
        }
    }

    /// The root element.
    pub fn root(&self) -> ElementId {
        ElementId::new(0)
    }

    /// Append a new element as the last child of `parent`.
    ///
    /// An unknown `parent` leaves the element detached: it exists but is in no scope.
    pub fn insert(&self, parent: ElementId, rect: Rect, flags: ElementFlags) -> ElementId {
        let mut doc = self.doc.borrow_mut();
        let id = ElementId::new(doc.nodes.len());
        let parent = match doc.nodes.get_mut(parent.idx()) {
            Some(p) => {
                p.children.push(id);
                Some(parent)
            }
            None => None,
        };
        doc.nodes.push(Node {
            rect,
            flags,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Flags of `id`, if it exists.
    pub fn flags(&self, id: ElementId) -> Option<ElementFlags> {
        self.doc.borrow().node(id).map(|n| n.flags)
    }

    /// Replace the flags of `id`.
    pub fn set_flags(&self, id: ElementId, flags: ElementFlags) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(id.idx()) {
            node.flags = flags;
        }
    }

    /// Move `id` to a new rectangle.
    pub fn set_rect(&self, id: ElementId, rect: Rect) {
        if let Some(node) = self.doc.borrow_mut().nodes.get_mut(id.idx()) {
            node.rect = rect;
        }
    }

    /// The element currently holding focus.
    pub fn active(&self) -> Option<ElementId> {
        self.doc.borrow().active
    }

    /// Set or clear focus directly, as a pointer click or blur would.
    ///
    /// Unlike [`FocusHost::focus`], this is not recorded in the focus log and does not run
    /// the focus hook.
    pub fn set_active(&self, id: Option<ElementId>) {
        self.doc.borrow_mut().active = id;
    }

    /// Every element focused through [`FocusHost::focus`], oldest first.
    pub fn focus_log(&self) -> Vec<ElementId> {
        self.doc.borrow().focus_log.clone()
    }

    /// Install (or clear) a callback that runs after each [`FocusHost::focus`].
    pub fn set_focus_hook(&self, hook: Option<FocusHook>) {
        self.doc.borrow_mut().focus_hook = hook;
    }
}

impl FocusHost for HeadlessHost {
    type Element = ElementId;
    type Scope = ElementId;

    fn focus_order_participants(&self, scope: &ElementId) -> Vec<ElementId> {
        let doc = self.doc.borrow();
        let mut out = Vec::new();
        // Pre-order walk of the subtree below `scope`.
        let mut stack: Vec<ElementId> = doc.children(*scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if doc
                .node(id)
                .is_some_and(|n| n.flags.contains(ElementFlags::FOCUS_ORDER))
            {
                out.push(id);
            }
            stack.extend(doc.children(id).iter().rev().copied());
        }
        out
    }

    fn has_focus_order(&self, element: ElementId) -> bool {
        self.flags(element)
            .is_some_and(|f| f.contains(ElementFlags::FOCUS_ORDER))
    }

    fn is_rendered(&self, element: ElementId) -> bool {
        self.doc.borrow().is_rendered(element)
    }

    fn is_disabled(&self, element: ElementId) -> bool {
        self.flags(element)
            .is_some_and(|f| f.contains(ElementFlags::DISABLED))
    }

    fn bounding_rect(&self, element: ElementId) -> Rect {
        self.doc
            .borrow()
            .node(element)
            .map_or(Rect::ZERO, |n| n.rect)
    }

    fn active_element(&self) -> Option<ElementId> {
        self.active()
    }

    fn focus(&mut self, element: ElementId) {
        let hook = {
            let mut doc = self.doc.borrow_mut();
            doc.active = Some(element);
            doc.focus_log.push(element);
            doc.focus_hook.take()
        };
        if let Some(mut hook) = hook {
            hook(element);
            let mut doc = self.doc.borrow_mut();
            // Keep a hook installed by the hook itself.
            if doc.focus_hook.is_none() {
                doc.focus_hook = Some(hook);
            }
        }
    }
}

/// Token for a [`KeyBus`] listener.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct KeySubscription(u64);

type SharedListener = Rc<RefCell<KeyListener>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, SharedListener)>,
}

/// In-memory [`KeySource`]: [`press`](KeyBus::press) delivers a key to every listener.
#[derive(Clone, Default)]
pub struct KeyBus {
    listeners: Rc<RefCell<Listeners>>,
}

impl fmt::Debug for KeyBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl KeyBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a key press to every current listener, in subscription order.
    ///
    /// A listener that is already running (the press came from inside it) is skipped.
    pub fn press(&self, key: &str) {
        let listeners: Vec<SharedListener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            if let Ok(mut listener) = listener.try_borrow_mut() {
                (*listener)(key);
            }
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl KeySource for KeyBus {
    type Subscription = KeySubscription;

    fn subscribe(&self, listener: KeyListener) -> KeySubscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners
            .entries
            .push((id, Rc::new(RefCell::new(listener))));
        KeySubscription(id)
    }

    fn unsubscribe(&self, subscription: KeySubscription) {
        self.listeners
            .borrow_mut()
            .entries
            .retain(|(id, _)| *id != subscription.0);
    }
}
