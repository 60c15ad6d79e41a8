/// The layout direction along which items stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// A one-dimensional extent along the stacking axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn from_size(start: f64, size: f64) -> Self {
        Self {
            start,
            end: start + size,
        }
    }

    /// Size of the span. Inverted spans report a negative size; callers clamp.
    pub fn size(&self) -> f64 {
        self.end - self.start
    }
}

/// Bounding geometry of a rendered element on both axes.
///
/// Coordinates must share an origin with [`ScrollSample::viewport`] (typically
/// client coordinates of the document).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemBounds {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl ItemBounds {
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Projects the bounds onto `axis`.
    pub fn span(&self, axis: Axis) -> Span {
        match axis {
            Axis::Vertical => Span::new(self.top, self.bottom),
            Axis::Horizontal => Span::new(self.left, self.right),
        }
    }
}

/// Identity of the scrollable host a list lives in.
///
/// Only used to detect that the host changed between two samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostKind {
    /// The document/window scrolls.
    #[default]
    Window,
    /// A scrollable ancestor element, identified by an opaque host-chosen id.
    Element(u64),
}

/// Scroll geometry observed at frame time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollSample {
    /// Current scroll offset of the host along the stacking axis.
    pub scroll_offset: f64,
    /// Size of the visible region along the stacking axis.
    pub viewport_size: f64,
    /// Visible region bounds, in the same coordinates as item bounds.
    pub viewport: Span,
    pub host: HostKind,
}

impl ScrollSample {
    /// A sample for a window host: the viewport starts at the client origin.
    pub fn for_window(scroll_offset: f64, viewport_size: f64) -> Self {
        Self {
            scroll_offset,
            viewport_size,
            viewport: Span::from_size(0.0, viewport_size),
            host: HostKind::Window,
        }
    }

    /// A sample for an element host whose visible region starts at `viewport_start`.
    pub fn for_element(
        id: u64,
        scroll_offset: f64,
        viewport_start: f64,
        viewport_size: f64,
    ) -> Self {
        Self {
            scroll_offset,
            viewport_size,
            viewport: Span::from_size(viewport_start, viewport_size),
            host: HostKind::Element(id),
        }
    }
}

/// Geometry of the currently materialized window, projected onto the stacking axis.
///
/// `items` are in render order: the first `offscreen_items_count` entries are the
/// offscreen buffer (their positions are meaningless, only their sizes are used),
/// followed by the on-screen items.
#[derive(Clone, Copy, Debug)]
pub struct Measurements<'a> {
    /// The leading spacer, sized by `scroll_offset_compensation`. Its start is the
    /// start of the list.
    pub spacer: Span,
    pub items: &'a [Span],
}

impl<'a> Measurements<'a> {
    pub fn new(spacer: Span, items: &'a [Span]) -> Self {
        Self { spacer, items }
    }

    /// Items after the offscreen buffer.
    pub fn on_screen(&self, offscreen: usize) -> &'a [Span] {
        self.items.get(offscreen..).unwrap_or(&[])
    }

    /// Offscreen buffer items (clamped to what was actually measured).
    pub fn offscreen(&self, offscreen: usize) -> &'a [Span] {
        &self.items[..offscreen.min(self.items.len())]
    }

    /// Leading edge of the on-screen window, measured directly from the DOM.
    pub fn window_start(&self, offscreen: usize) -> f64 {
        match self.items.get(offscreen) {
            Some(first) => first.start,
            None => self.spacer.end,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VirtualRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

/// What the host should render for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowFrame {
    /// Indexes of the source list to materialize, offscreen buffer included.
    pub range: VirtualRange,
    /// How many items at the start of `range` are kept mounted off-canvas.
    pub offscreen_items_count: usize,
    /// Size of the leading spacer.
    pub leading_spacer: f64,
    /// Size of the trailing spacer.
    pub trailing_spacer: f64,
}

/// Lifecycle of one virtualized list instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    /// The first two items are rendered so the stacking axis can be detected.
    Bootstrapping,
    Windowed,
    /// Every item is rendered.
    Unvirtualized,
    Disposed,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Disposed)
    }
}
